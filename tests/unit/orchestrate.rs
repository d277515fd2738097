use super::*;

#[test]
fn single_hat_starts_terminal() {
    let s = HopState::start(ImageBuffer::new(vec![1u8]), HatCount::ONE);
    assert!(matches!(s, HopState::Terminal { .. }));
    assert_eq!(s.iteration(), 1);
    assert_eq!(s.knobs(), TransformKnobs::for_iteration(1));
}

#[test]
fn several_hats_start_running_at_count() {
    let s = HopState::start(ImageBuffer::new(vec![1u8]), HatCount::new(4).unwrap());
    assert!(matches!(s, HopState::Running { iteration: 4, .. }));
    assert_eq!(s.knobs().rotate_degrees, 40.0);
}

#[test]
fn state_steps_down_to_terminal() {
    let img = ImageBuffer::new(vec![1u8]);
    assert!(matches!(
        HopState::at(2, img.clone()),
        HopState::Running { iteration: 2, .. }
    ));
    assert!(matches!(HopState::at(1, img), HopState::Terminal { .. }));
}
