#![forbid(unsafe_code)]

/// Horizontal bar of `width` cells filled in proportion to `value / max`.
#[must_use]
pub fn bar(value: f64, max: f64, width: usize, icons: bool) -> String {
    let (full, empty) = if icons { ('█', '░') } else { ('#', '.') };
    let filled = if max > 0.0 && value > 0.0 {
        let ratio = (value / max).min(1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let cells = (ratio * width as f64).round() as usize;
        cells.max(1).min(width)
    } else {
        0
    };
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat_n(full, filled));
    out.extend(std::iter::repeat_n(empty, width - filled));
    out
}

/// One row of a day grid: `span` marks columns `from..to` out of `days`.
#[must_use]
pub fn span_row(days: usize, span: Option<(usize, usize)>, icons: bool) -> String {
    let (on, off) = if icons { ('▇', '·') } else { ('=', '.') };
    (0..days)
        .map(|i| match span {
            Some((from, to)) if i >= from && i < to => on,
            _ => off,
        })
        .collect()
}
