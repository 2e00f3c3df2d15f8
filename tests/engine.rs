use cellbedform::{BedformEngine, Grid, Params, RunConfig, StepObserver};
use proptest::prelude::*;

fn params(d: f64, q: f64, l0: f64, b: f64) -> Params {
    Params { d, q, l0, b }
}

fn ramp(w: usize, h: usize) -> Grid<f64> {
    Grid::from_fn(w, h, |x, y| ((x * 7 + y * 13) % 11) as f64 * 0.1)
}

#[test]
fn zero_rates_leave_bed_bit_identical() {
    let start = ramp(9, 7);
    let mut e = BedformEngine::from_elevation(start.clone(), params(0.0, 0.0, 7.3, 2.0)).unwrap();
    e.run(3, &mut []);
    assert_eq!(e.elevation(), &start);
}

#[test]
fn four_by_four_all_zero_example() {
    // round(x + 7.3) mod 4 = [3, 0, 1, 2]: each column receives exactly one
    // source per row, so the entrained load is returned everywhere.
    let mut e = BedformEngine::from_elevation(Grid::new(4, 4), Params::default()).unwrap();
    e.run_one_step();
    for y in 0..4 {
        assert_eq!(e.destination().row(y), &[3, 0, 1, 2]);
        for x in 0..4 {
            assert!(e.elevation().get(x, y).abs() < 1e-12);
        }
    }
    assert!(e.saltation_length().data.iter().all(|&l| (l - 7.3).abs() < 1e-12));
}

#[test]
fn same_start_same_result() {
    let p = Params::default();
    let mut a = BedformEngine::from_elevation(ramp(20, 12), p).unwrap();
    let mut b = BedformEngine::from_elevation(ramp(20, 12), p).unwrap();
    a.run(25, &mut []);
    b.run(25, &mut []);
    assert_eq!(a.elevation(), b.elevation());
}

#[test]
fn same_seed_same_result() {
    let cfg = RunConfig { xgrid: 16, ygrid: 8, steps: 10, ..RunConfig::default() };
    let (a, _) = cellbedform::simulate(&cfg, &mut []).unwrap();
    let (b, _) = cellbedform::simulate(&cfg, &mut []).unwrap();
    assert_eq!(a.elevation(), b.elevation());
    assert_eq!(a.steps_taken(), 10);
}

#[test]
fn observers_see_every_step_in_order() {
    struct Log(Vec<(usize, usize, (usize, usize))>, usize);
    impl StepObserver for Log {
        fn on_step(&mut self, step: usize, total: usize, bed: &Grid<f64>) {
            self.0.push((step, total, bed.shape()));
        }
        fn on_finish(&mut self, total: usize) {
            self.1 = total;
        }
    }

    let mut log = Log(Vec::new(), 0);
    let mut e = BedformEngine::with_seed(10, 5, Params::default(), 1).unwrap();
    let mut observers: [&mut dyn StepObserver; 1] = [&mut log];
    e.run(4, &mut observers);
    assert_eq!(log.0, (1..=4).map(|s| (s, 4, (10, 5))).collect::<Vec<_>>());
    assert_eq!(log.1, 4);
}

#[test]
fn ripples_develop_from_random_bed() {
    let mut e = BedformEngine::with_seed(64, 32, Params::default(), 2024).unwrap();
    e.run(200, &mut []);
    let bed = e.elevation();
    assert!(bed.data.iter().all(|v| v.is_finite()));
    let mean = e.total_mass() / bed.data.len() as f64;
    let var = bed.data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / bed.data.len() as f64;
    // Diffusion alone drives the variance of uniform noise far below 1e-3.
    assert!(var > 0.1, "variance {var}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn shape_never_changes(
        w in 1usize..24,
        h in 1usize..24,
        steps in 0usize..6,
        seed in any::<u64>(),
    ) {
        let mut e = BedformEngine::with_seed(w, h, Params::default(), seed).unwrap();
        e.run(steps, &mut []);
        prop_assert_eq!(e.dims(), (w, h));
        prop_assert_eq!(e.elevation().data.len(), w * h);
    }

    #[test]
    fn lengths_nonnegative_and_destinations_valid(
        w in 1usize..24,
        h in 1usize..12,
        l0 in -20.0f64..20.0,
        b in -5.0f64..5.0,
        seed in any::<u64>(),
    ) {
        let mut e = BedformEngine::with_seed(w, h, params(0.8, 0.6, l0, b), seed).unwrap();
        e.run(2, &mut []);
        prop_assert!(e.saltation_length().data.iter().all(|&l| l >= 0.0));
        prop_assert!(e.destination().data.iter().all(|&x| x < w));
    }

    #[test]
    fn saltation_conserves_mass(
        w in 1usize..24,
        h in 1usize..12,
        q in -1.0f64..1.0,
        l0 in -10.0f64..30.0,
        b in -3.0f64..3.0,
        seed in any::<u64>(),
    ) {
        let mut e = BedformEngine::with_seed(w, h, params(0.0, q, l0, b), seed).unwrap();
        let before = e.total_mass();
        e.run(5, &mut []);
        prop_assert!((e.total_mass() - before).abs() < 1e-9 * (w * h) as f64);
    }

    #[test]
    fn diffusion_conserves_mass(
        w in 1usize..24,
        h in 1usize..12,
        d in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let mut e = BedformEngine::with_seed(w, h, params(d, 0.0, 0.0, 0.0), seed).unwrap();
        let before = e.total_mass();
        e.run(5, &mut []);
        prop_assert!((e.total_mass() - before).abs() < 1e-9 * (w * h) as f64);
    }
}
