//! Rule-based hand shape classification from landmark geometry.

use rochambeau_types::{
    hand::{landmarks::*, HandLandmarks, Handedness},
    moves::Move,
};

const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
const FINGER_PIPS: [usize; 4] = [INDEX_PIP, MIDDLE_PIP, RING_PIP, PINKY_PIP];

/// Extension flags in thumb, index, middle, ring, pinky order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    pub const THUMB: usize = 0;
    pub const INDEX: usize = 1;
    pub const MIDDLE: usize = 2;
    pub const RING: usize = 3;
    pub const PINKY: usize = 4;

    pub fn measure(hand: &HandLandmarks, handedness: Handedness) -> Self {
        let mut fingers = [false; 5];

        // The thumb folds sideways, so compare x; outward depends on the hand.
        let tip = hand.point(THUMB_TIP).x;
        let ip = hand.point(THUMB_IP).x;
        fingers[Self::THUMB] = match handedness {
            Handedness::Right => tip > ip,
            Handedness::Left => tip < ip,
        };

        for (slot, (tip, pip)) in fingers[1..]
            .iter_mut()
            .zip(FINGER_TIPS.iter().zip(FINGER_PIPS.iter()))
        {
            *slot = hand.point(*tip).y < hand.point(*pip).y;
        }

        Self(fingers)
    }

    pub fn extended(&self) -> usize {
        self.0.iter().filter(|up| **up).count()
    }

    pub fn is_extended(&self, finger: usize) -> bool {
        self.0.get(finger).copied().unwrap_or(false)
    }

    pub fn gesture(&self) -> Option<Move> {
        let total = self.extended();
        if total == 0 {
            return Some(Move::Rock);
        }
        if total == 5 {
            return Some(Move::Paper);
        }
        let classic = self.0 == [false, true, true, false, false];
        let two_up = total == 2 && self.is_extended(Self::INDEX) && self.is_extended(Self::MIDDLE);
        if classic || two_up {
            return Some(Move::Scissors);
        }
        None
    }
}

/// Classify a hand into a gesture, or `None` when the shape is ambiguous.
pub fn classify(hand: &HandLandmarks, handedness: Handedness) -> Option<Move> {
    FingerState::measure(hand, handedness).gesture()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rochambeau_types::hand::{landmarks::*, HandLandmarks, Landmark};

    /// Right hand (as labelled by the detector) with the given fingers raised.
    pub fn right_hand(fingers: [bool; 5]) -> HandLandmarks {
        let mut hand = HandLandmarks::default();
        hand.points[WRIST] = Landmark::new(0.5, 0.9);
        hand.points[THUMB_IP] = Landmark::new(0.40, 0.70);
        hand.points[THUMB_TIP] = if fingers[0] {
            Landmark::new(0.45, 0.68)
        } else {
            Landmark::new(0.35, 0.72)
        };
        let columns = [
            (INDEX_PIP, INDEX_TIP, 0.44),
            (MIDDLE_PIP, MIDDLE_TIP, 0.50),
            (RING_PIP, RING_TIP, 0.56),
            (PINKY_PIP, PINKY_TIP, 0.62),
        ];
        for (i, (pip, tip, x)) in columns.into_iter().enumerate() {
            hand.points[pip] = Landmark::new(x, 0.55);
            hand.points[tip] = if fingers[i + 1] {
                Landmark::new(x, 0.30)
            } else {
                Landmark::new(x, 0.65)
            };
        }
        hand
    }

    /// Same pose seen on the other hand: mirror the x axis.
    pub fn mirrored(hand: &HandLandmarks) -> HandLandmarks {
        let mut out = hand.clone();
        for p in out.points.iter_mut() {
            p.x = 1.0 - p.x;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{mirrored, right_hand};
    use super::*;

    #[test]
    fn all_curled_is_rock() {
        let hand = right_hand([false; 5]);
        assert_eq!(FingerState::measure(&hand, Handedness::Right).extended(), 0);
        assert_eq!(classify(&hand, Handedness::Right), Some(Move::Rock));
    }

    #[test]
    fn all_extended_is_paper() {
        let hand = right_hand([true; 5]);
        assert_eq!(classify(&hand, Handedness::Right), Some(Move::Paper));
    }

    #[test]
    fn index_and_middle_is_scissors() {
        let hand = right_hand([false, true, true, false, false]);
        assert_eq!(classify(&hand, Handedness::Right), Some(Move::Scissors));
    }

    #[test]
    fn ambiguous_shapes_are_unrecognised() {
        for fingers in [
            [false, true, false, false, false],
            [true, true, true, false, false],
            [false, true, false, false, true],
            [true, true, true, true, false],
        ] {
            assert_eq!(
                classify(&right_hand(fingers), Handedness::Right),
                None,
                "{fingers:?}"
            );
        }
    }

    #[test]
    fn thumb_direction_follows_handedness() {
        let right = right_hand([true, false, false, false, false]);
        let state = FingerState::measure(&right, Handedness::Right);
        assert!(state.is_extended(FingerState::THUMB));

        let left = mirrored(&right);
        let state = FingerState::measure(&left, Handedness::Left);
        assert!(state.is_extended(FingerState::THUMB));
        assert_eq!(state.extended(), 1);

        // Same geometry under the wrong label reads the thumb as folded.
        let state = FingerState::measure(&left, Handedness::Right);
        assert!(!state.is_extended(FingerState::THUMB));
    }

    #[test]
    fn mirrored_paper_still_paper() {
        let left = mirrored(&right_hand([true; 5]));
        assert_eq!(classify(&left, Handedness::Left), Some(Move::Paper));
    }
}
