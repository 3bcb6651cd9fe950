#![allow(clippy::float_cmp)]

use glam::{Mat4, Quat, Vec3};

use super::*;
use crate::testing::{FakeDisplay, hit_at, hit_with_rotation};

fn ready() -> Placement {
    let mut placement = Placement::new();
    placement.attach_model(ModelHandle::new(1, 2).prepared(0.1));
    placement
}

fn bits(state: &PlacementState) -> Vec<u32> {
    let t = &state.object;
    let mut out: Vec<u32> = t.position.to_array().iter().map(|v| v.to_bits()).collect();
    out.extend(t.rotation.to_array().iter().map(|v| v.to_bits()));
    out.extend(t.scale.to_array().iter().map(|v| v.to_bits()));
    out.push(state.shadow.y.to_bits());
    out.push(u32::from(state.anchored));
    out
}

// =============================================================
// HitResult
// =============================================================

#[test]
fn hit_translation_reads_last_column() {
    let hit = HitResult::from_cols_array(&[
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.25, -1.5, 3.0, 1.0,
    ]);
    assert_eq!(hit.translation(), Vec3::new(0.25, -1.5, 3.0));
}

#[test]
fn hit_orientation_extracts_rotation() {
    let rotation = Quat::from_rotation_y(0.7);
    let hit = hit_with_rotation(Vec3::ONE, rotation);
    assert!(hit.orientation().abs_diff_eq(rotation, 1e-6));
}

// =============================================================
// Preconditions
// =============================================================

#[test]
fn place_without_model_is_model_not_ready() {
    let display = FakeDisplay::with_hits(vec![hit_at(1.0, 0.0, -2.0)]);
    let mut placement = Placement::new();
    let before = *placement.state();

    assert_eq!(placement.try_place_at(&display, 0.5, 0.5, 1.0, false), Err(ArError::ModelNotReady));
    assert!(!placement.place_at(&display, 0.5, 0.5, 1.0, false));
    assert_eq!(*placement.state(), before);
    assert_eq!(display.hit_queries.get(), 0);
}

#[test]
fn place_rejects_non_finite_input() {
    let display = FakeDisplay::with_hits(vec![hit_at(1.0, 0.0, -2.0)]);
    let mut placement = ready();
    let err = placement.try_place_at(&display, f32::NAN, 0.5, 1.0, false).unwrap_err();
    assert!(matches!(err, ArError::InvalidGesture(_)));
    assert!(!placement.state().anchored);
}

#[test]
fn place_clamps_coordinates_before_query() {
    let display = FakeDisplay::with_hits(vec![hit_at(0.0, 0.0, 0.0)]);
    let mut placement = ready();
    placement.try_place_at(&display, -0.2, 1.7, 1.0, false).unwrap();
    assert_eq!(display.last_query.get(), Some((0.0, 1.0)));
}

// =============================================================
// Empty hit-test
// =============================================================

#[test]
fn empty_hit_leaves_state_bit_identical() {
    let empty = FakeDisplay::default();
    let mut placement = ready();
    placement.try_place_at(&FakeDisplay::with_hits(vec![hit_at(0.3, -0.4, -1.2)]), 0.5, 0.5, 1.0, false).unwrap();
    placement.rotate_y(33.0).unwrap();

    for i in 0..=10 {
        for j in 0..=10 {
            let (x, y) = (i as f32 / 10.0, j as f32 / 10.0);
            let before = bits(placement.state());
            assert_eq!(placement.try_place_at(&empty, x, y, 1.0, true), Err(ArError::NoHit { x, y }));
            assert!(!placement.place_at(&empty, x, y, 0.5, false));
            assert_eq!(bits(placement.state()), before, "({x}, {y})");
        }
    }
}

#[test]
fn position_undefined_until_first_hit() {
    let mut placement = ready();
    assert_eq!(placement.state().position(), None);
    assert_eq!(placement.state().object.position, Vec3::splat(OFFSCREEN_SPAWN));

    placement.place_at(&FakeDisplay::default(), 0.5, 0.5, 1.0, false);
    assert_eq!(placement.state().position(), None);

    placement.place_at(&FakeDisplay::with_hits(vec![hit_at(0.0, 0.0, -1.0)]), 0.5, 0.5, 1.0, false);
    assert_eq!(placement.state().position(), Some(Vec3::new(0.0, 0.0, -1.0)));

    placement.place_at(&FakeDisplay::default(), 0.5, 0.5, 1.0, false);
    assert!(placement.state().position().is_some());
}

// =============================================================
// Successful placement
// =============================================================

#[test]
fn snap_places_exactly_on_hit() {
    let display = FakeDisplay::with_hits(vec![hit_at(1.0, 0.0, -2.0)]);
    let mut placement = ready();
    let position = placement.try_place_at(&display, 0.5, 0.5, 1.0, false).unwrap();
    assert_eq!(position, Vec3::new(1.0, 0.0, -2.0));
    assert_eq!(placement.state().object.position, Vec3::new(1.0, 0.0, -2.0));
    assert_eq!(placement.state().shadow.y, 0.0);
    assert!(placement.state().anchored);
}

#[test]
fn nearest_hit_wins() {
    let display = FakeDisplay::with_hits(vec![hit_at(0.0, -0.5, -1.0), hit_at(0.0, -3.0, -9.0)]);
    let mut placement = ready();
    placement.try_place_at(&display, 0.5, 0.5, 1.0, false).unwrap();
    assert_eq!(placement.state().object.position, Vec3::new(0.0, -0.5, -1.0));
    assert_eq!(placement.state().shadow.y, -0.5);
}

#[test]
fn shadow_follows_every_accepted_hit() {
    let mut placement = ready();
    for (i, y) in [-1.2_f32, -0.4, 0.0, 0.75].into_iter().enumerate() {
        let display = FakeDisplay::with_hits(vec![hit_at(i as f32, y, -1.0)]);
        placement.try_place_at(&display, 0.5, 0.5, 0.3, false).unwrap();
        assert_eq!(placement.state().shadow.y, y);
    }
}

#[test]
fn easing_interpolates_toward_hit() {
    let mut placement = ready();
    placement.try_place_at(&FakeDisplay::with_hits(vec![hit_at(0.0, 0.0, 0.0)]), 0.5, 0.5, 1.0, false).unwrap();
    let display = FakeDisplay::with_hits(vec![hit_at(2.0, 0.0, -4.0)]);
    let position = placement.try_place_at(&display, 0.5, 0.5, 0.5, false).unwrap();
    assert!(position.abs_diff_eq(Vec3::new(1.0, 0.0, -2.0), 1e-6));
}

#[test]
fn zero_easing_keeps_position_but_moves_shadow() {
    let mut placement = ready();
    placement.try_place_at(&FakeDisplay::with_hits(vec![hit_at(0.0, 0.0, 0.0)]), 0.5, 0.5, 1.0, false).unwrap();
    let display = FakeDisplay::with_hits(vec![hit_at(5.0, -1.0, 5.0)]);
    placement.try_place_at(&display, 0.5, 0.5, 0.0, false).unwrap();
    assert_eq!(placement.state().object.position, Vec3::ZERO);
    assert_eq!(placement.state().shadow.y, -1.0);
}

#[test]
fn orientation_copied_only_when_requested() {
    let rotation = Quat::from_rotation_y(1.1);
    let display = FakeDisplay::with_hits(vec![hit_with_rotation(Vec3::new(0.0, 0.0, -1.0), rotation)]);

    let mut kept = ready();
    kept.try_place_at(&display, 0.5, 0.5, 1.0, false).unwrap();
    assert_eq!(kept.state().object.rotation, Quat::IDENTITY);

    let mut copied = ready();
    copied.try_place_at(&display, 0.5, 0.5, 1.0, true).unwrap();
    assert!(copied.state().object.rotation.abs_diff_eq(rotation, 1e-6));
}

#[test]
fn degenerate_hit_keeps_orientation_finite() {
    let matrix = Mat4::from_scale_rotation_translation(Vec3::ZERO, Quat::from_rotation_y(0.4), Vec3::new(0.0, 0.0, -1.0));
    let display = FakeDisplay::with_hits(vec![HitResult::new(matrix)]);
    let mut placement = ready();
    assert_eq!(placement.try_place_at(&display, 0.5, 0.5, 1.0, true), Ok(Vec3::new(0.0, 0.0, -1.0)));
    assert_eq!(placement.state().object.rotation, Quat::IDENTITY);
}

#[test]
fn attach_model_carries_scale() {
    let placement = ready();
    assert_eq!(placement.state().object.scale, Vec3::splat(0.1));
    assert!(placement.model().is_some_and(|m| m.cast_shadow));
}

// =============================================================
// Rotation
// =============================================================

#[test]
fn rotate_y_turns_about_vertical_axis_only() {
    let mut placement = ready();
    placement.try_place_at(&FakeDisplay::with_hits(vec![hit_at(1.0, 0.0, -2.0)]), 0.5, 0.5, 1.0, false).unwrap();
    placement.rotate_y(90.0).unwrap();
    let state = placement.state();
    assert_eq!(state.object.position, Vec3::new(1.0, 0.0, -2.0));
    assert!(state.object.rotation.abs_diff_eq(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2), 1e-6));
}

#[test]
fn rotate_y_accumulates() {
    let mut placement = ready();
    placement.rotate_y(-15.0).unwrap();
    placement.rotate_y(45.0).unwrap();
    let expected = Quat::from_rotation_y(30f32.to_radians());
    assert!(placement.state().object.rotation.abs_diff_eq(expected, 1e-6));
}

#[test]
fn rotate_y_without_model_is_model_not_ready() {
    let mut placement = Placement::new();
    assert_eq!(placement.rotate_y(10.0), Err(ArError::ModelNotReady));
    assert_eq!(placement.state().object.rotation, Quat::IDENTITY);
}
