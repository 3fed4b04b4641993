//! Posture classification over 2-D pose landmarks.
//!
//! Pure geometry: a pose estimator elsewhere supplies normalised landmark
//! positions (x, y in `0..1`, y growing downwards) and this module decides
//! which way the subject faces and whether their posture is good.
//!
//! Rules, in order:
//!
//! 1. **Facing** is `Side` when the two elbow-shoulder-hip angles differ by
//!    more than 30° or the nose sits more than 0.05 off the shoulder
//!    midpoint horizontally.
//! 2. With all four torso landmarks visible, the **trunk angle** (hip to
//!    shoulder midpoint, 180° = upright) decides:
//!    below `180 - 3` is bending (bad), above `180 + 3` is resting (good).
//! 3. Inside the upright band the **head height** is compared with a
//!    baseline captured once, 5 s after the analyzer started.  A nose more
//!    than 10 px below the baseline is bending (bad).

use serde::{Deserialize, Serialize};

/// One pose landmark in normalised image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Estimator confidence that the point is visible (`0..1`).
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    fn midpoint(self, other: Self) -> (f32, f32) {
        ((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// The landmarks the classifier reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub nose: Landmark,
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
    pub left_elbow: Landmark,
    pub right_elbow: Landmark,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Front,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Good,
    Bad,
}

/// Trunk classification against the upright band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trunk {
    Bending,
    Upright,
    Resting,
}

/// Tunable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureThresholds {
    /// Head more than this many pixels below baseline counts as bending.
    pub head_offset_px: f32,
    /// Half-width of the upright trunk band around 180°.
    pub back_bend_deg: f32,
    pub side_angle_diff_deg: f32,
    /// Horizontal nose offset (normalised) that marks a side view.
    pub side_nose_offset: f32,
    pub min_visibility: f32,
    /// Delay before the head baseline is captured.
    pub calibration_delay_ms: u32,
}

impl Default for PostureThresholds {
    fn default() -> Self {
        Self {
            head_offset_px: 10.0,
            back_bend_deg: 3.0,
            side_angle_diff_deg: 30.0,
            side_nose_offset: 0.05,
            min_visibility: 0.5,
            calibration_delay_ms: 5000,
        }
    }
}

/// Result of classifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureReport {
    pub facing: Facing,
    pub left_arm_angle: f32,
    pub right_arm_angle: f32,
    /// `false` when a shoulder or hip was not visible enough.
    pub torso_detected: bool,
    pub trunk_angle: Option<f32>,
    pub trunk: Option<Trunk>,
    /// Nose height in pixels; only measured while upright.
    pub head_height_px: Option<f32>,
    pub baseline_head_px: Option<f32>,
    pub verdict: Verdict,
}

/// Angle at `b` between `b→a` and `b→c`, in `[0, 360)` degrees.
pub fn joint_angle(a: Landmark, b: Landmark, c: Landmark) -> f32 {
    let to_c = (c.y - b.y).atan2(c.x - b.x);
    let to_a = (a.y - b.y).atan2(a.x - b.x);
    wrap_degrees((to_c - to_a).to_degrees())
}

/// Direction from hip midpoint to shoulder midpoint, in `[0, 360)` degrees.
/// Straight up the image is 180°.
pub fn trunk_angle(mid_shoulder: (f32, f32), mid_hip: (f32, f32)) -> f32 {
    let dx = mid_shoulder.0 - mid_hip.0;
    let dy = mid_shoulder.1 - mid_hip.1;
    wrap_degrees(dx.atan2(dy).to_degrees())
}

fn wrap_degrees(deg: f32) -> f32 {
    if deg < 0.0 { deg + 360.0 } else { deg }
}

/// Stateful classifier; holds the head-height baseline.
#[derive(Debug, Clone)]
pub struct PostureAnalyzer {
    thresholds: PostureThresholds,
    started_ms: u32,
    baseline_head_px: Option<f32>,
}

impl PostureAnalyzer {
    pub fn new(thresholds: PostureThresholds, now_ms: u32) -> Self {
        Self {
            thresholds,
            started_ms: now_ms,
            baseline_head_px: None,
        }
    }

    pub fn baseline_head_px(&self) -> Option<f32> {
        self.baseline_head_px
    }

    /// Classify one frame taken at `now_ms` from an image `image_height`
    /// pixels tall.
    pub fn evaluate(&mut self, pose: &Pose, image_height: f32, now_ms: u32) -> PostureReport {
        let t = self.thresholds;

        let left_arm_angle = joint_angle(pose.left_elbow, pose.left_shoulder, pose.left_hip);
        let right_arm_angle = joint_angle(pose.right_elbow, pose.right_shoulder, pose.right_hip);
        let mid_shoulder = pose.left_shoulder.midpoint(pose.right_shoulder);
        let facing = if (left_arm_angle - right_arm_angle).abs() > t.side_angle_diff_deg
            || (pose.nose.x - mid_shoulder.0).abs() > t.side_nose_offset
        {
            Facing::Side
        } else {
            Facing::Front
        };

        let mut report = PostureReport {
            facing,
            left_arm_angle,
            right_arm_angle,
            torso_detected: false,
            trunk_angle: None,
            trunk: None,
            head_height_px: None,
            baseline_head_px: self.baseline_head_px,
            verdict: Verdict::Good,
        };

        let torso = [
            pose.left_shoulder,
            pose.right_shoulder,
            pose.left_hip,
            pose.right_hip,
        ];
        if !torso.iter().all(|l| l.visibility > t.min_visibility) {
            return report;
        }
        report.torso_detected = true;

        let angle = trunk_angle(mid_shoulder, pose.left_hip.midpoint(pose.right_hip));
        report.trunk_angle = Some(angle);
        let trunk = if angle < 180.0 - t.back_bend_deg {
            Trunk::Bending
        } else if angle > 180.0 + t.back_bend_deg {
            Trunk::Resting
        } else {
            Trunk::Upright
        };
        report.trunk = Some(trunk);

        match trunk {
            Trunk::Bending => report.verdict = Verdict::Bad,
            Trunk::Resting => {}
            Trunk::Upright => {
                let head = pose.nose.y * image_height;
                report.head_height_px = Some(head);
                if self.baseline_head_px.is_none()
                    && now_ms.wrapping_sub(self.started_ms) > t.calibration_delay_ms
                {
                    log::info!("posture: head baseline captured at {:.0} px", head);
                    self.baseline_head_px = Some(head);
                }
                report.baseline_head_px = self.baseline_head_px;
                if self
                    .baseline_head_px
                    .is_some_and(|base| head > base + t.head_offset_px)
                {
                    report.verdict = Verdict::Bad;
                }
            }
        }
        report
    }
}
