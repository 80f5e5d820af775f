use proptest::prelude::*;

use squad_guessr::core::fuzzy::{levenshtein, name_distance};
use squad_guessr::core::{score_location, score_name, CoordinateTransform, MapMetadata};
use squad_guessr::types::{DisplayPoint, WorldSize};

fn word() -> impl Strategy<Value = String> {
    "[a-z' ]{0,12}"
}

proptest! {
    #[test]
    fn location_points_never_increase_with_distance(
        a in 0.0f64..2000.0,
        b in 0.0f64..2000.0,
        size in 500.0f64..8000.0,
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let near_points = score_location(near, size).points;
        let far_points = score_location(far, size).points;
        prop_assert!(near_points >= far_points);
        prop_assert!(near_points <= 100);
    }

    #[test]
    fn misses_past_the_last_step_score_zero(extra in 0.001f64..10_000.0, size in 500.0f64..8000.0) {
        let last = 500.0 * size / 3000.0;
        prop_assert_eq!(score_location(last + extra, size).points, 0);
    }

    #[test]
    fn levenshtein_is_a_metric(a in word(), b in word(), c in word()) {
        prop_assert_eq!(levenshtein(&a, &a), 0);
        if a != b {
            prop_assert!(levenshtein(&a, &b) > 0);
        }
        prop_assert_eq!(levenshtein(&a, &b), levenshtein(&b, &a));
        prop_assert!(levenshtein(&a, &c) <= levenshtein(&a, &b) + levenshtein(&b, &c));
    }

    #[test]
    fn levenshtein_is_bounded_by_the_longer_input(a in word(), b in word()) {
        let longest = a.chars().count().max(b.chars().count());
        prop_assert!(levenshtein(&a, &b) <= longest);
    }

    #[test]
    fn single_word_names_match_in_any_case(name in "[A-Za-z]{1,12}") {
        let verdict = score_name(&name, &name);
        prop_assert!(verdict.correct);
        prop_assert_eq!(verdict.points, 100);
        prop_assert_eq!(name_distance(&name.to_uppercase(), &name), 0);
    }

    #[test]
    fn display_round_trip_inside_the_minimap(
        x in 0.0f64..=256.0,
        y in -256.0f64..=0.0,
        w in 100.0f64..10_000.0,
        h in 100.0f64..10_000.0,
    ) {
        let map = MapMetadata::new("m", WorldSize::new(w, h));
        let t = CoordinateTransform::new(&map).unwrap();
        let p = DisplayPoint::new(x, y);
        prop_assert!(t.contains(p));

        let back = t.world_to_display(t.guess_to_world(p));
        prop_assert!((back.x - x).abs() < 1e-9);
        prop_assert!((back.y - y).abs() < 1e-9);
    }

    #[test]
    fn clamped_guesses_stay_on_the_map(x in -1000.0f64..1000.0, y in -1000.0f64..1000.0) {
        let map = MapMetadata::new("m", WorldSize::square(3000.0));
        let t = CoordinateTransform::new(&map).unwrap();
        let world = t.guess_to_world(DisplayPoint::new(x, y));
        prop_assert!((0.0..=3000.0).contains(&world.x));
        prop_assert!((-3000.0..=0.0).contains(&world.y));
    }
}
