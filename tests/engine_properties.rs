use insightpm::engine::{
    LoadClass, WorkloadOptions, completed_by_date, completion_rate, is_overdue, user_workload,
};
use insightpm::model::{NewTask, Task, TaskStatus, User};
use proptest::prelude::*;
use time::macros::{date, datetime};
use time::{Date, Duration};

const TODAY: Date = date!(2023 - 11 - 24);

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

prop_compose! {
    fn arb_task()(
        status in arb_status(),
        assignee in 0u8..3,
        estimate in 0.0f64..60.0,
        due_offset in prop::option::of(-30i64..30),
        done_offset in 0i64..40,
    ) -> Task {
        let mut t = Task::from_new(
            String::new(),
            NewTask {
                title: "generated".to_owned(),
                status,
                assignee_id: format!("u{assignee}"),
                estimated_time: estimate,
                due_date: due_offset.map(|d| TODAY + Duration::days(d)),
                ..NewTask::default()
            },
        );
        if status == TaskStatus::Done {
            t.completed_at = Some(datetime!(2023-10-01 9:00 UTC) + Duration::days(done_offset));
        }
        t
    }
}

fn member(daily: f64) -> User {
    User {
        id: "u0".to_owned(),
        name: "Member".to_owned(),
        role: String::new(),
        avatar: String::new(),
        daily_capacity_hours: daily,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_completion_rate_is_a_percentage(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let rate = completion_rate(&tasks);
        prop_assert!(rate <= 100);
        let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
        if tasks.is_empty() || done == 0 {
            prop_assert_eq!(rate, 0);
        }
        if !tasks.is_empty() && done == tasks.len() {
            prop_assert_eq!(rate, 100);
        }
    }

    #[test]
    fn prop_overdue_iff_open_and_past_due(t in arb_task()) {
        let expected = t.status != TaskStatus::Done && t.due_date.is_some_and(|d| d < TODAY);
        prop_assert_eq!(is_overdue(&t, TODAY), expected);
    }

    #[test]
    fn prop_adding_active_work_never_lowers_load(
        tasks in prop::collection::vec(arb_task(), 0..20),
        extra in 0.0f64..40.0,
        daily in 1.0f64..10.0,
    ) {
        let opts = WorkloadOptions::default();
        let user = member(daily);
        let before = user_workload(&user, &tasks, &opts);

        let mut more = tasks.clone();
        more.push(Task::from_new(
            "extra".to_owned(),
            NewTask {
                title: "extra".to_owned(),
                assignee_id: "u0".to_owned(),
                estimated_time: extra,
                ..NewTask::default()
            },
        ));
        let after = user_workload(&user, &more, &opts);
        prop_assert!(after.percentage >= before.percentage);
        prop_assert_eq!(after.task_count, before.task_count + 1);
    }

    #[test]
    fn prop_done_tasks_do_not_count_against_capacity(
        tasks in prop::collection::vec(arb_task(), 0..20),
    ) {
        let opts = WorkloadOptions::default();
        let user = member(8.0);
        let open: Vec<Task> = tasks
            .iter()
            .filter(|t| t.status.is_active())
            .cloned()
            .collect();
        prop_assert_eq!(
            user_workload(&user, &tasks, &opts),
            user_workload(&user, &open, &opts)
        );
    }

    #[test]
    fn prop_classification_follows_percentage(
        tasks in prop::collection::vec(arb_task(), 0..20),
        daily in 0.0f64..10.0,
    ) {
        let w = user_workload(&member(daily), &tasks, &WorkloadOptions::default());
        let expected = if w.percentage > 100 {
            LoadClass::Overallocated
        } else if w.percentage >= 80 {
            LoadClass::AtCapacity
        } else {
            LoadClass::Available
        };
        prop_assert_eq!(w.class, expected);
    }

    #[test]
    fn prop_completed_series_is_sorted_and_bounded(
        tasks in prop::collection::vec(arb_task(), 0..60),
        window in 1usize..20,
    ) {
        let series = completed_by_date(&tasks, window);
        prop_assert!(series.len() <= window);
        prop_assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        prop_assert!(series.iter().all(|d| d.completed > 0));

        let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
        let counted: usize = series.iter().map(|d| d.completed).sum();
        prop_assert!(counted <= done);
        if series.len() < window {
            prop_assert_eq!(counted, done);
        }
    }
}
