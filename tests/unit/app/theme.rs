use super::*;

#[test]
fn truecolor_keeps_rgb_values() {
    let mut theme = UiTheme::default();
    let before = theme.running_fg;
    theme.apply_color_support(TerminalColorSupport::TrueColor);
    assert_eq!(theme.running_fg, before);
}

#[test]
fn ansi16_maps_every_rgb_color_to_a_base_index() {
    let mut theme = UiTheme::default();
    theme.apply_color_support(TerminalColorSupport::Ansi16);

    for color in [
        theme.project_fg,
        theme.service_fg,
        theme.running_fg,
        theme.paused_fg,
        theme.exited_fg,
    ] {
        match color {
            Color::Indexed(i) => assert!(i <= 15, "index {i} out of the 16-color range"),
            other => panic!("expected indexed color, got {other:?}"),
        }
    }
}

#[test]
fn ansi256_maps_rgb_into_color_cube() {
    assert_eq!(rgb_to_ansi256_index(0, 0, 0), 16);
    assert_eq!(rgb_to_ansi256_index(255, 255, 255), 231);
    assert_eq!(rgb_to_ansi256_index(255, 0, 0), 196);
}

#[test]
fn nearest_ansi16_color_is_picked() {
    assert_eq!(rgb_to_ansi16_index(250, 5, 5), 9);
    assert_eq!(rgb_to_ansi16_index(1, 1, 1), 0);
}

#[test]
fn container_colors_follow_state() {
    let theme = UiTheme::default();
    assert_eq!(theme.container_fg(ContainerState::Running), theme.running_fg);
    assert_eq!(theme.container_fg(ContainerState::Paused), theme.paused_fg);
    assert_eq!(theme.container_fg(ContainerState::Exited), theme.exited_fg);
    assert_eq!(theme.container_fg(ContainerState::Unknown), theme.exited_fg);
}
