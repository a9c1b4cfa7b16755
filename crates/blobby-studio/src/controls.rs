use blobby_engine::input::{InputFrame, InputState, Key};
use blobby_engine::pipeline::Tunables;

/// Tunable change per key press (or key repeat).
pub const RADIUS_STEP: f32 = 0.1;
pub const SMOOTHING_STEP: f32 = 0.05;
pub const INTERPOLATION_STEP: f32 = 0.05;
pub const SPEED_STEP: f32 = 0.1;

/// What the keyboard asked for this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Action {
    Exit,
    ReloadShaders,
    ToggleAnimation,
    CycleView,
    RadiusScale(f32),
    Smoothing(f32),
    Interpolation(f32),
    Speed(f32),
}

/// Key bindings, in a fixed order so several keys in one frame apply
/// predictably. Shift turns the R/S/I increments into decrements.
pub fn actions(frame: &InputFrame, state: &InputState) -> Vec<Action> {
    let mut out = Vec::new();

    if frame.keys_pressed.contains(&Key::Escape) {
        out.push(Action::Exit);
        return out;
    }
    if frame.keys_pressed.contains(&Key::F5) {
        out.push(Action::ReloadShaders);
    }
    if frame.keys_pressed.contains(&Key::Space) {
        out.push(Action::ToggleAnimation);
    }
    if frame.keys_pressed.contains(&Key::V) {
        out.push(Action::CycleView);
    }

    let sign = if state.modifiers.shift { -1.0 } else { 1.0 };
    if frame.key_triggered(Key::R) {
        out.push(Action::RadiusScale(sign * RADIUS_STEP));
    }
    if frame.key_triggered(Key::S) {
        out.push(Action::Smoothing(sign * SMOOTHING_STEP));
    }
    if frame.key_triggered(Key::I) {
        out.push(Action::Interpolation(sign * INTERPOLATION_STEP));
    }
    if frame.key_triggered(Key::ArrowUp) {
        out.push(Action::Speed(SPEED_STEP));
    }
    if frame.key_triggered(Key::ArrowDown) {
        out.push(Action::Speed(-SPEED_STEP));
    }

    out
}

/// Applies a tunable action. Returns false for actions that are not about
/// tunables.
pub fn apply(tunables: &mut Tunables, action: Action) -> bool {
    match action {
        Action::ToggleAnimation => tunables.animate = !tunables.animate,
        Action::CycleView => tunables.view_mode = tunables.view_mode.next(),
        Action::RadiusScale(d) => tunables.set_radius_scale(tunables.radius_scale() + d),
        Action::Smoothing(d) => tunables.set_smoothing(tunables.smoothing() + d),
        Action::Interpolation(d) => tunables.set_interpolation(tunables.interpolation() + d),
        Action::Speed(d) => tunables.set_speed(tunables.speed() + d),
        Action::Exit | Action::ReloadShaders => return false,
    }
    true
}
