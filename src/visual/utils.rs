/// Ease-out cubic: fast at start, decelerates at end
pub fn ease_out_cubic(t: f32) -> f32 {
    let x = 1.0 - t;
    1.0 - x * x * x
}
