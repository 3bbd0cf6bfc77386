//! Landmark connection tables.
//!
//! Index pairs into the 33-point body model and the 468-point face mesh.

pub type Connection = (usize, usize);

/// Body skeleton edges.
pub const POSE_CONNECTIONS: &[Connection] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 7),
    (0, 4),
    (4, 5),
    (5, 6),
    (6, 8),
    (9, 10),
    (11, 12),
    (11, 13),
    (13, 15),
    (15, 17),
    (15, 19),
    (15, 21),
    (17, 19),
    (12, 14),
    (14, 16),
    (16, 18),
    (16, 20),
    (16, 22),
    (18, 20),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (24, 26),
    (25, 27),
    (26, 28),
    (27, 29),
    (28, 30),
    (29, 31),
    (30, 32),
    (27, 31),
    (28, 32),
];

pub const FACE_RIGHT_EYE: &[Connection] = &[
    (33, 7),
    (7, 163),
    (163, 144),
    (144, 145),
    (145, 153),
    (153, 154),
    (154, 155),
    (155, 133),
    (33, 246),
    (246, 161),
    (161, 160),
    (160, 159),
    (159, 158),
    (158, 157),
    (157, 173),
    (173, 133),
];

pub const FACE_LEFT_EYE: &[Connection] = &[
    (263, 249),
    (249, 390),
    (390, 373),
    (373, 374),
    (374, 380),
    (380, 381),
    (381, 382),
    (382, 362),
    (263, 466),
    (466, 388),
    (388, 387),
    (387, 386),
    (386, 385),
    (385, 384),
    (384, 398),
    (398, 362),
];

pub const FACE_OVAL: &[Connection] = &[
    (10, 338),
    (338, 297),
    (297, 332),
    (332, 284),
    (284, 251),
    (251, 389),
    (389, 356),
    (356, 454),
    (454, 323),
    (323, 361),
    (361, 288),
    (288, 397),
    (397, 365),
    (365, 379),
    (379, 378),
    (378, 400),
    (400, 377),
    (377, 152),
    (152, 148),
    (148, 176),
    (176, 149),
    (149, 150),
    (150, 136),
    (136, 172),
    (172, 58),
    (58, 132),
    (132, 93),
    (93, 234),
    (234, 127),
    (127, 162),
    (162, 21),
    (21, 54),
    (54, 103),
    (103, 67),
    (67, 109),
    (109, 10),
];

pub const FACE_LIPS: &[Connection] = &[
    // outer, lower
    (61, 146),
    (146, 91),
    (91, 181),
    (181, 84),
    (84, 17),
    (17, 314),
    (314, 405),
    (405, 321),
    (321, 375),
    (375, 291),
    // outer, upper
    (61, 185),
    (185, 40),
    (40, 39),
    (39, 37),
    (37, 0),
    (0, 267),
    (267, 269),
    (269, 270),
    (270, 409),
    (409, 291),
    // inner, lower
    (78, 95),
    (95, 88),
    (88, 178),
    (178, 87),
    (87, 14),
    (14, 317),
    (317, 402),
    (402, 318),
    (318, 324),
    (324, 308),
    // inner, upper
    (78, 191),
    (191, 80),
    (80, 81),
    (81, 82),
    (82, 13),
    (13, 312),
    (312, 311),
    (311, 310),
    (310, 415),
    (415, 308),
];

/// Which face feature a connector set outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceFeature {
    RightEye,
    LeftEye,
    Oval,
    Lips,
}

impl FaceFeature {
    /// Draw order.
    pub const ALL: [FaceFeature; 4] = [
        FaceFeature::RightEye,
        FaceFeature::LeftEye,
        FaceFeature::Oval,
        FaceFeature::Lips,
    ];

    pub fn connections(&self) -> &'static [Connection] {
        match self {
            FaceFeature::RightEye => FACE_RIGHT_EYE,
            FaceFeature::LeftEye => FACE_LEFT_EYE,
            FaceFeature::Oval => FACE_OVAL,
            FaceFeature::Lips => FACE_LIPS,
        }
    }

    pub fn is_eye(&self) -> bool {
        matches!(self, FaceFeature::RightEye | FaceFeature::LeftEye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_indices_fit_body_model() {
        assert!(POSE_CONNECTIONS.iter().all(|&(a, b)| a < 33 && b < 33));
    }

    #[test]
    fn oval_is_closed_ring() {
        let first = FACE_OVAL.first().unwrap().0;
        let last = FACE_OVAL.last().unwrap().1;
        assert_eq!(first, last);
        for pair in FACE_OVAL.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn face_indices_fit_mesh() {
        for feature in FaceFeature::ALL {
            assert!(feature.connections().iter().all(|&(a, b)| a < 478 && b < 478));
        }
    }
}
