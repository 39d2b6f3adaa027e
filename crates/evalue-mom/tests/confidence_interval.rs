use evalue_core::EvalueError;
use evalue_mom::Mom;


const G: f64 = 0.1339827;
const ALPHA: f64 = 0.05;

fn within(got: f64, want: f64) -> bool {
    let diff = (got - want).abs();
    diff <= 5e-5 || diff <= 5e-5 * got.abs().max(want.abs())
}

// (observations used, lower, upper)
const DATASET_INTERVALS: &[(usize, f64, f64)] = &[
    (14, -98.62792, 101.9612),
    (15, -15.42631, 19.09297),
    (16, -6.51332, 9.346654),
    (17, -3.997455, 7.930789),
    (18, -3.390325, 7.451863),
    (19, -2.914129, 7.085558),
    (20, -2.54023, 6.94023),
    (21, -2.218689, 6.818689),
    (22, -1.32434, 6.32434),
    (23, -0.8378349, 5.837835),
    (24, -0.6311292, 5.381129),
    (25, -0.2024012, 5.424623),
    (26, -0.2640066, 5.064007),
    (27, -0.2703812, 4.893911),
    (28, -0.3181225, 4.596197),
    (29, -0.1938408, 4.537275),
    (30, 0.03226012, 4.523295),
    (31, 0.1665839, 4.552714),
    (32, 0.1053324, 4.331915),
    (33, 0.146038, 4.238577),
    (34, 0.258684, 4.268789),
    (35, 0.4691052, 4.388038),
    (36, 0.4001898, 4.209334),
    (37, 0.4728427, 4.175642),
    (38, 0.204692, 3.977126),
    (39, 0.242893, 3.880102),
    (40, 0.02959331, 3.70778),
    (41, 0.09503225, 3.677915),
    (42, 0.187117, 3.661853),
    (43, 0.1630632, 3.554328),
    (44, 0.2437182, 3.545102),
    (45, 0.2999012, 3.521527),
    (46, 0.2753359, 3.42921),
    (47, 0.1695833, 3.324962),
    (48, 0.01554447, 3.198369),
    (49, 0.09703757, 3.230722),
    (50, -0.03914359, 3.109656),
    (51, -0.09881216, 3.012658),
    (52, -0.101948, 2.948102),
    (53, -0.02592925, 2.977496),
    (54, -0.0197774, 2.926371),
    (55, -0.02336174, 2.867277),
    (56, -0.02621921, 2.811933),
    (57, -0.02844918, 2.759976),
    (58, -0.03013572, 2.711088),
    (59, 0.02910432, 2.733568),
    (60, 0.02600273, 2.688283),
    (61, 0.05555108, 2.673886),
    (62, 0.05803339, 2.629532),
    (63, 0.0606844, 2.5878),
    (64, 0.09619272, 2.580249),
    (65, 0.164917, 2.643432),
    (66, 0.2235697, 2.673489),
    (67, 0.2893588, 2.73207),
    (68, 0.3201729, 2.723983),
    (69, 0.3191499, 2.687573),
    (70, 0.3184285, 2.653),
    (71, 0.3934321, 2.751012),
    (72, 0.3192517, 2.680748),
    (73, 0.3795185, 2.730091),
    (74, 0.3659826, 2.689573),
    (75, 0.3947169, 2.686364),
    (76, 0.4634515, 2.771476),
    (77, 0.4909541, 2.768155),
    (78, 0.5380819, 2.795251),
    (79, 0.5372391, 2.766607),
    (80, 0.5069519, 2.720065),
    (81, 0.5503801, 2.746323),
    (82, 0.4655226, 2.677335),
    (83, 0.5074294, 2.701873),
    (84, 0.547685, 2.725042),
    (85, 0.5863884, 2.746945),
    (86, 0.5733911, 2.711162),
    (87, 0.592393, 2.706653),
    (88, 0.6058952, 2.694312),
    (89, 0.6240386, 2.690044),
    (90, 0.6579574, 2.703745),
    (91, 0.6927843, 2.723882),
    (92, 0.6879246, 2.69983),
    (93, 0.7209153, 2.719085),
    (94, 0.7527797, 2.737416),
    (95, 0.7835767, 2.754885),
    (96, 0.7536425, 2.718056),
    (97, 0.7403016, 2.685942),
    (98, 0.7542303, 2.681797),
    (99, 0.7677302, 2.677724),
    (100, 0.8158708, 2.719483),
    (101, 0.8458001, 2.732066),
    (102, 0.7919001, 2.687914),
    (103, 0.8054778, 2.684987),
    (104, 0.8505302, 2.723191),
    (105, 0.9067115, 2.788464),
    (106, 0.9019647, 2.769012),
    (107, 0.9293165, 2.786079),
    (108, 0.9558729, 2.80246),
    (109, 0.9622272, 2.790154),
    (110, 0.9463786, 2.760288),
    (111, 0.9712439, 2.769933),
    (112, 0.9316632, 2.727311),
    (113, 0.9261686, 2.708762),
    (114, 0.9010986, 2.678306),
    (115, 0.896407, 2.66098),
    (116, 0.8821625, 2.63386),
    (117, 0.9070171, 2.650176),
    (118, 0.8933751, 2.623986),
    (119, 0.8479675, 2.58622),
    (120, 0.8438691, 2.570272),
    (121, 0.8308287, 2.544929),
];

#[test]
fn intervals_along_dataset_match_reference() -> Result<(), EvalueError> {
    let rows = fixtures::carleton()?;
    let mom = Mom { g: G };
    for &(n, lower, upper) in DATASET_INTERVALS {
        let (x, y) = fixtures::split(&rows, n);
        let ci = mom.confidence_interval(&x, &y, ALPHA)?;
        assert!(within(ci.lower, lower), "n={n}: lower {} want {lower}", ci.lower);
        assert!(within(ci.upper, upper), "n={n}: upper {} want {upper}", ci.upper);
    }
    Ok(())
}

#[test]
fn small_samples_give_unbounded_interval() -> Result<(), EvalueError> {
    let rows = fixtures::carleton()?;
    let mom = Mom { g: G };
    for n in 9..=13 {
        let (x, y) = fixtures::split(&rows, n);
        let ci = mom.confidence_interval(&x, &y, ALPHA)?;
        assert!(!ci.is_bounded(), "n={n}");
        assert_eq!(ci.lower, f64::NEG_INFINITY);
        assert_eq!(ci.upper, f64::INFINITY);
    }
    Ok(())
}

#[test]
fn interval_ends_sit_on_the_rejection_boundary() -> Result<(), EvalueError> {
    let rows = fixtures::carleton()?;
    let (x, y) = fixtures::split(&rows, 60);
    let mom = Mom { g: G };
    let ci = mom.confidence_interval(&x, &y, ALPHA)?;
    for end in [ci.lower, ci.upper] {
        let e = mom.e_value_with_null(&x, &y, end)?;
        assert!((e - 1.0 / ALPHA).abs() < 1e-6, "e-value {e} at {end}");
    }
    let center = 0.5 * (ci.lower + ci.upper);
    assert!(mom.e_value_with_null(&x, &y, center)? < 1.0 / ALPHA);
    Ok(())
}

#[test]
fn wider_alpha_gives_narrower_interval() -> Result<(), EvalueError> {
    let rows = fixtures::carleton()?;
    let (x, y) = fixtures::split(&rows, rows.len());
    let mom = Mom { g: G };
    let strict = mom.confidence_interval(&x, &y, 0.01)?;
    let loose = mom.confidence_interval(&x, &y, 0.2)?;
    assert!(strict.lower < loose.lower && loose.upper < strict.upper);
    Ok(())
}
