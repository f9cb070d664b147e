use frame_overlay_core::{ContainerRect, Detection, Point2};

use crate::LabelStyle;

/// `"{class} {pct}%"`, with `" • {condition}"` appended when a condition is set.
pub fn format_label(detection: &Detection) -> String {
    let pct = (detection.confidence * 100.0).round();
    match detection.condition_text() {
        Some(condition) => format!("{} {}% • {}", detection.class_label, pct, condition),
        None => format!("{} {}%", detection.class_label, pct),
    }
}

/// Where a label goes relative to its box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    pub background: ContainerRect,
    /// Top-left corner of the text.
    pub text_origin: Point2<f64>,
    /// `true` when the label was flipped under the box.
    pub below: bool,
}

/// Place a label of `text_width` pixels on the top edge of `bbox`.
///
/// Labels sit above the box unless the box is too close to the top of the
/// container to fit one, in which case they go under the bottom edge.
pub fn place_label(bbox: &ContainerRect, text_width: f64, style: &LabelStyle) -> LabelPlacement {
    let height = style.height();
    let below = bbox.y < height + style.margin;
    let y = if below { bbox.bottom() } else { bbox.y - height };
    let background = ContainerRect::new(bbox.x, y, text_width + 2.0 * style.padding, height);
    LabelPlacement {
        background,
        text_origin: Point2::new(bbox.x + style.padding, y + style.padding),
        below,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_overlay_core::BoxSpec;

    fn det(conf: f64) -> Detection {
        Detection::new("Signage", conf, BoxSpec::percentage(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn label_rounds_confidence_to_whole_percent() {
        assert_eq!(format_label(&det(0.874)), "Signage 87%");
        assert_eq!(format_label(&det(0.875)), "Signage 88%");
        assert_eq!(format_label(&det(1.0)), "Signage 100%");
        assert_eq!(format_label(&det(0.0)), "Signage 0%");
    }

    #[test]
    fn condition_is_appended() {
        assert_eq!(
            format_label(&det(0.5).with_condition("broken")),
            "Signage 50% • broken"
        );
        assert_eq!(format_label(&det(0.5).with_condition("")), "Signage 50%");
    }

    #[test]
    fn label_sits_above_box_when_there_is_room() {
        let style = LabelStyle::default();
        let bbox = ContainerRect::new(100.0, 200.0, 50.0, 40.0);
        let p = place_label(&bbox, 60.0, &style);
        assert!(!p.below);
        assert_eq!(p.background.bottom(), bbox.y);
        assert_eq!(p.background.x, bbox.x);
        assert_eq!(p.background.width, 60.0 + 2.0 * style.padding);
        assert_eq!(p.text_origin, Point2::new(103.0, 200.0 - style.height() + 3.0));
    }

    #[test]
    fn label_flips_below_near_top_edge() {
        let style = LabelStyle::default();
        let bbox = ContainerRect::new(10.0, style.height() + style.margin - 0.5, 50.0, 40.0);
        let p = place_label(&bbox, 30.0, &style);
        assert!(p.below);
        assert_eq!(p.background.y, bbox.bottom());

        let bbox = ContainerRect::new(10.0, style.height() + style.margin, 50.0, 40.0);
        assert!(!place_label(&bbox, 30.0, &style).below);
    }
}
