use digital_soul::avatar::{
    Animator, AnimatorParams, BodyField, FrameOutcome, GlyphColor, RecordingSurface, Region,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SIZES: [(f32, f32); 4] = [(400.0, 400.0), (1280.0, 720.0), (320.0, 900.0), (57.0, 33.0)];

#[test]
fn region_shares_hold_at_every_size() {
    let mut rng = StdRng::seed_from_u64(11);
    for (w, h) in SIZES {
        let mut field = BodyField::new(900);
        assert!(field.resize(w, h, &mut rng));
        let total = field.particles().len() as f32;
        assert_eq!(total, 900.0);
        for region in Region::ALL {
            let share = field.count_in(region) as f32 / total;
            assert!(
                (share - region.share()).abs() <= 0.02,
                "{region:?} share {share} at {w}x{h}"
            );
        }
    }
}

#[test]
fn particles_keep_their_positions_while_animating() {
    let mut anim = Animator::new(AnimatorParams::default(), StdRng::seed_from_u64(3));
    let mut surface = RecordingSurface::new(640.0, 480.0);
    anim.frame(&mut surface, 0.0, false);
    let before: Vec<(f32, f32)> = anim.field().particles().iter().map(|p| (p.x, p.y)).collect();

    for i in 1..200 {
        let out = anim.frame(&mut surface, i as f32 * 0.016, i % 2 == 0);
        assert!(matches!(out, FrameOutcome::Drawn { regenerated: false, .. }));
    }
    let after: Vec<(f32, f32)> = anim.field().particles().iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(before, after);
}

#[test]
fn resize_rebuilds_the_field_for_the_new_area() {
    let mut anim = Animator::new(AnimatorParams::default(), StdRng::seed_from_u64(5));
    let mut surface = RecordingSurface::new(400.0, 400.0);
    anim.frame(&mut surface, 0.0, false);
    let generation = anim.field().generation();

    surface.set_size(Some((800.0, 600.0)));
    let out = anim.frame(&mut surface, 0.016, false);
    assert_eq!(
        out,
        FrameOutcome::Drawn {
            particles: 900,
            regenerated: true
        }
    );
    assert!(anim.field().generation() > generation);
    assert_eq!(anim.field().size(), Some((800.0, 600.0)));
}

#[test]
fn head_is_drawn_in_its_own_color() {
    let mut anim = Animator::new(AnimatorParams::default(), StdRng::seed_from_u64(9));
    let mut surface = RecordingSurface::new(500.0, 500.0);
    anim.frame(&mut surface, 1.0, false);
    let head = surface
        .calls()
        .iter()
        .filter(|c| c.color == GlyphColor::HEAD)
        .count();
    assert_eq!(head, anim.field().count_in(Region::Head));
}

fn mean_variance(series: &[Vec<f32>]) -> f32 {
    let per_particle: Vec<f32> = series
        .iter()
        .map(|s| {
            let n = s.len() as f32;
            let mean = s.iter().sum::<f32>() / n;
            s.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n
        })
        .collect();
    per_particle.iter().sum::<f32>() / per_particle.len() as f32
}

#[test]
fn speaking_makes_the_head_pulse_harder_than_the_torso() {
    let mut anim = Animator::new(AnimatorParams::default(), StdRng::seed_from_u64(21));
    let mut surface = RecordingSurface::new(600.0, 600.0);
    anim.frame(&mut surface, 0.0, true);

    let regions: Vec<Region> = anim.field().particles().iter().map(|p| p.region).collect();
    let mut head: Vec<Vec<f32>> = Vec::new();
    let mut torso: Vec<Vec<f32>> = Vec::new();
    for r in &regions {
        match r {
            Region::Head => head.push(Vec::new()),
            Region::Torso => torso.push(Vec::new()),
            _ => {}
        }
    }

    for tick in 0..1000 {
        anim.update(tick as f32 * 0.016, true);
        let (mut h, mut t) = (0, 0);
        for p in anim.field().particles() {
            match p.region {
                Region::Head => {
                    head[h].push(p.opacity);
                    h += 1;
                }
                Region::Torso => {
                    torso[t].push(p.opacity);
                    t += 1;
                }
                _ => {}
            }
        }
    }

    let head_var = mean_variance(&head);
    let torso_var = mean_variance(&torso);
    assert!(
        head_var > 2.0 * torso_var,
        "head variance {head_var} vs torso {torso_var}"
    );
}

#[test]
fn opacity_stays_in_unit_range() {
    let mut anim = Animator::new(AnimatorParams::default(), StdRng::seed_from_u64(33));
    let mut surface = RecordingSurface::new(300.0, 500.0);
    for i in 0..300 {
        anim.frame(&mut surface, i as f32 * 0.05, i % 3 == 0);
        for call in surface.calls() {
            assert!((0.0..=1.0 + 1e-6).contains(&call.opacity));
        }
    }
}
