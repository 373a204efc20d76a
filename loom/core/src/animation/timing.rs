//! CSS timing functions

/// Velocity rises towards the middle and slows at the end
pub const EASE_TIMING: &str = "ease";
/// Starts slowly and speeds up until complete
pub const EASE_IN_TIMING: &str = "ease-in";
/// Starts quickly and slows down
pub const EASE_OUT_TIMING: &str = "ease-out";
/// Starts slowly, speeds up, slows down again
pub const EASE_IN_OUT_TIMING: &str = "ease-in-out";
/// Even speed
pub const LINEAR_TIMING: &str = "linear";

/// `steps(n)`: `n` stops displayed for equal lengths of time
#[must_use]
pub fn steps_timing(step_count: u32) -> String {
    format!("steps({step_count})")
}

/// `cubic-bezier(x1, y1, x2, y2)` with `x1`/`x2` clamped to `0..=1`
#[must_use]
pub fn cubic_bezier_timing(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
    format!(
        "cubic-bezier({}, {y1}, {}, {y2})",
        x1.clamp(0.0, 1.0),
        x2.clamp(0.0, 1.0)
    )
}

/// Whether `text` is a timing function the browser accepts
///
/// The empty text stands for the default (`ease`).
#[must_use]
pub fn is_valid_timing(text: &str) -> bool {
    let text = text.trim();
    if matches!(
        text,
        "" | EASE_TIMING | EASE_IN_TIMING | EASE_OUT_TIMING | EASE_IN_OUT_TIMING | LINEAR_TIMING
    ) {
        return true;
    }

    let Some(body) = text.strip_suffix(')') else {
        return false;
    };
    let Some((name, args)) = body.split_once('(') else {
        return false;
    };
    match name.trim() {
        "steps" => args.trim().parse::<i64>().is_ok(),
        "cubic-bezier" => {
            let params: Vec<&str> = args.split(',').collect();
            params.len() == 4 && params.iter().all(|p| p.trim().parse::<f64>().is_ok())
        }
        _ => false,
    }
}
