use bingo::settings::AudioSettings;
use bingo::sfx::{DRAW_SFX_VOLUME, ROLL_SFX_VOLUME};

#[test]
fn roll_loop_is_softer_than_the_draw_chime() {
    assert!(
        ROLL_SFX_VOLUME < DRAW_SFX_VOLUME,
        "expected ROLL_SFX_VOLUME < DRAW_SFX_VOLUME (the called number should stand out)"
    );
}

#[test]
fn sfx_volumes_are_in_valid_range() {
    for (name, v) in [("roll", ROLL_SFX_VOLUME), ("draw", DRAW_SFX_VOLUME)] {
        assert!(v > 0.0, "{name} volume must be > 0.0, got {v}");
        assert!(v <= 1.0, "{name} volume must be <= 1.0, got {v}");
    }
}

#[test]
fn full_user_volume_never_exceeds_unity_gain() {
    let audio = AudioSettings::default();
    assert!(audio.effective_roll_gain() * ROLL_SFX_VOLUME <= 1.0);
    assert!(audio.effective_draw_gain() * DRAW_SFX_VOLUME <= 1.0);
}
