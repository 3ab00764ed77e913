//! WHO Child Growth Standards LMS subset, 0-24 months.
//!
//! 25 points per series at roughly monthly spacing. Source: WHO Child Growth
//! Standards (https://www.who.int/tools/child-growth-standards/standards).

use super::{ReferencePoint, ReferenceTable, SexSeries};

const fn p(age_in_days: u32, l: f64, m: f64, s: f64) -> ReferencePoint {
    ReferencePoint { age_in_days, l, m, s }
}

const MALE_WEIGHT: [ReferencePoint; 25] = [
    p(0, 0.3487, 3.3464, 0.14602),
    p(30, 0.2581, 4.4709, 0.13395),
    p(61, 0.1970, 5.5675, 0.12385),
    p(91, 0.1738, 6.3762, 0.11727),
    p(122, 0.1553, 7.0023, 0.11316),
    p(152, 0.1395, 7.5105, 0.11080),
    p(183, 0.1257, 7.9340, 0.10958),
    p(213, 0.1134, 8.2970, 0.10902),
    p(244, 0.1021, 8.6151, 0.10882),
    p(274, 0.0917, 8.9014, 0.10881),
    p(305, 0.0820, 9.1649, 0.10891),
    p(335, 0.0730, 9.4122, 0.10906),
    p(365, 0.0644, 9.6479, 0.10925),
    p(396, 0.0563, 9.8749, 0.10949),
    p(426, 0.0487, 10.0953, 0.10976),
    p(457, 0.0413, 10.3108, 0.11007),
    p(487, 0.0343, 10.5228, 0.11041),
    p(518, 0.0276, 10.7319, 0.11078),
    p(548, 0.0211, 10.9385, 0.11117),
    p(579, 0.0148, 11.1430, 0.11159),
    p(609, 0.0087, 11.3462, 0.11203),
    p(640, 0.0027, 11.5486, 0.11250),
    p(670, -0.0031, 11.7504, 0.11299),
    p(701, -0.0089, 11.9514, 0.11350),
    p(731, -0.0146, 12.1515, 0.11404),
];

const MALE_HEIGHT: [ReferencePoint; 25] = [
    p(0, 1.0, 49.8842, 0.03686),
    p(30, 1.0, 54.7244, 0.03557),
    p(61, 1.0, 58.4249, 0.03424),
    p(91, 1.0, 61.4292, 0.03328),
    p(122, 1.0, 63.8861, 0.03257),
    p(152, 1.0, 65.9026, 0.03204),
    p(183, 1.0, 67.6236, 0.03165),
    p(213, 1.0, 69.1645, 0.03139),
    p(244, 1.0, 70.6009, 0.03124),
    p(274, 1.0, 71.9687, 0.03117),
    p(305, 1.0, 73.2812, 0.03117),
    p(335, 1.0, 74.5388, 0.03123),
    p(365, 1.0, 75.7488, 0.03133),
    p(396, 1.0, 76.9186, 0.03147),
    p(426, 1.0, 78.0497, 0.03164),
    p(457, 1.0, 79.1458, 0.03184),
    p(487, 1.0, 80.2097, 0.03207),
    p(518, 1.0, 81.2433, 0.03232),
    p(548, 1.0, 82.2487, 0.03259),
    p(579, 1.0, 83.2277, 0.03289),
    p(609, 1.0, 84.1821, 0.03321),
    p(640, 1.0, 85.1133, 0.03354),
    p(670, 1.0, 86.0227, 0.03390),
    p(701, 1.0, 86.9115, 0.03428),
    p(731, 1.0, 87.7815, 0.03467),
];

const MALE_HEAD: [ReferencePoint; 25] = [
    p(0, 1.0, 34.4618, 0.03496),
    p(30, 1.0, 37.2759, 0.03175),
    p(61, 1.0, 39.1285, 0.02953),
    p(91, 1.0, 40.5135, 0.02796),
    p(122, 1.0, 41.6317, 0.02676),
    p(152, 1.0, 42.5576, 0.02581),
    p(183, 1.0, 43.3306, 0.02504),
    p(213, 1.0, 43.9803, 0.02441),
    p(244, 1.0, 44.5321, 0.02387),
    p(274, 1.0, 45.0061, 0.02341),
    p(305, 1.0, 45.4182, 0.02302),
    p(335, 1.0, 45.7804, 0.02268),
    p(365, 1.0, 46.1013, 0.02239),
    p(396, 1.0, 46.3876, 0.02213),
    p(426, 1.0, 46.6448, 0.02190),
    p(457, 1.0, 46.8773, 0.02170),
    p(487, 1.0, 47.0888, 0.02152),
    p(518, 1.0, 47.2821, 0.02135),
    p(548, 1.0, 47.4595, 0.02120),
    p(579, 1.0, 47.6230, 0.02106),
    p(609, 1.0, 47.7741, 0.02094),
    p(640, 1.0, 47.9142, 0.02082),
    p(670, 1.0, 48.0448, 0.02071),
    p(701, 1.0, 48.1669, 0.02061),
    p(731, 1.0, 48.2815, 0.02052),
];

const FEMALE_WEIGHT: [ReferencePoint; 25] = [
    p(0, 0.3809, 3.2322, 0.14171),
    p(30, 0.2986, 4.1873, 0.13007),
    p(61, 0.2422, 5.1282, 0.12094),
    p(91, 0.2201, 5.8458, 0.11608),
    p(122, 0.2024, 6.4237, 0.11368),
    p(152, 0.1871, 6.8985, 0.11248),
    p(183, 0.1735, 7.2970, 0.11187),
    p(213, 0.1612, 7.6422, 0.11156),
    p(244, 0.1499, 7.9487, 0.11140),
    p(274, 0.1394, 8.2254, 0.11132),
    p(305, 0.1295, 8.4800, 0.11129),
    p(335, 0.1202, 8.7192, 0.11130),
    p(365, 0.1113, 8.9481, 0.11135),
    p(396, 0.1028, 9.1699, 0.11143),
    p(426, 0.0947, 9.3868, 0.11153),
    p(457, 0.0869, 9.6008, 0.11165),
    p(487, 0.0794, 9.8124, 0.11179),
    p(518, 0.0721, 10.0226, 0.11194),
    p(548, 0.0651, 10.2315, 0.11211),
    p(579, 0.0582, 10.4393, 0.11229),
    p(609, 0.0516, 10.6464, 0.11248),
    p(640, 0.0451, 10.8534, 0.11268),
    p(670, 0.0387, 11.0608, 0.11290),
    p(701, 0.0325, 11.2691, 0.11312),
    p(731, 0.0264, 11.4788, 0.11336),
];

const FEMALE_HEIGHT: [ReferencePoint; 25] = [
    p(0, 1.0, 49.1477, 0.03790),
    p(30, 1.0, 53.6872, 0.03640),
    p(61, 1.0, 57.0673, 0.03496),
    p(91, 1.0, 59.8029, 0.03393),
    p(122, 1.0, 62.0899, 0.03321),
    p(152, 1.0, 64.0301, 0.03268),
    p(183, 1.0, 65.7311, 0.03228),
    p(213, 1.0, 67.2873, 0.03199),
    p(244, 1.0, 68.7498, 0.03179),
    p(274, 1.0, 70.1435, 0.03168),
    p(305, 1.0, 71.4818, 0.03163),
    p(335, 1.0, 72.7718, 0.03164),
    p(365, 1.0, 74.0157, 0.03169),
    p(396, 1.0, 75.2176, 0.03178),
    p(426, 1.0, 76.3817, 0.03190),
    p(457, 1.0, 77.5099, 0.03205),
    p(487, 1.0, 78.6055, 0.03223),
    p(518, 1.0, 79.6711, 0.03243),
    p(548, 1.0, 80.7079, 0.03266),
    p(579, 1.0, 81.7182, 0.03291),
    p(609, 1.0, 82.7036, 0.03318),
    p(640, 1.0, 83.6654, 0.03347),
    p(670, 1.0, 84.6050, 0.03378),
    p(701, 1.0, 85.5236, 0.03411),
    p(731, 1.0, 86.4227, 0.03446),
];

const FEMALE_HEAD: [ReferencePoint; 25] = [
    p(0, 1.0, 33.8787, 0.03496),
    p(30, 1.0, 36.5463, 0.03252),
    p(61, 1.0, 38.2521, 0.03073),
    p(91, 1.0, 39.5328, 0.02936),
    p(122, 1.0, 40.5574, 0.02826),
    p(152, 1.0, 41.4184, 0.02735),
    p(183, 1.0, 42.1515, 0.02658),
    p(213, 1.0, 42.7846, 0.02592),
    p(244, 1.0, 43.3370, 0.02533),
    p(274, 1.0, 43.8248, 0.02481),
    p(305, 1.0, 44.2606, 0.02435),
    p(335, 1.0, 44.6542, 0.02394),
    p(365, 1.0, 45.0131, 0.02357),
    p(396, 1.0, 45.3431, 0.02324),
    p(426, 1.0, 45.6485, 0.02294),
    p(457, 1.0, 45.9331, 0.02267),
    p(487, 1.0, 46.1998, 0.02242),
    p(518, 1.0, 46.4508, 0.02219),
    p(548, 1.0, 46.6880, 0.02198),
    p(579, 1.0, 46.9131, 0.02178),
    p(609, 1.0, 47.1274, 0.02160),
    p(640, 1.0, 47.3322, 0.02143),
    p(670, 1.0, 47.5285, 0.02127),
    p(701, 1.0, 47.7170, 0.02112),
    p(731, 1.0, 47.8985, 0.02098),
];

/// Builds the bundled WHO table.
pub(super) fn who_table() -> ReferenceTable {
    ReferenceTable {
        male: SexSeries {
            weight: MALE_WEIGHT.to_vec(),
            height: MALE_HEIGHT.to_vec(),
            head: MALE_HEAD.to_vec(),
        },
        female: SexSeries {
            weight: FEMALE_WEIGHT.to_vec(),
            height: FEMALE_HEIGHT.to_vec(),
            head: FEMALE_HEAD.to_vec(),
        },
    }
}
