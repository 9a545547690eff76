//! Parametric archetype illustration.
//!
//! An illustration is a 120×120 SVG built by stacking fixed shape fragments
//! chosen by trait value. Every accent fill and stroke derives from one
//! color, so the image is a pure function of the color and the trait set.

use crate::registry::{
    AccentColor, ArchetypeProfile, BrowShape, CheekAccessory, EarShape, EyeShape, Marking,
    MouthShape, NoseShape, Registry, Snout, TraitSet,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Gradient stop for outlines and solid accent fills.
const STRONG_OPACITY: f32 = 0.9;
/// Gradient stop toward the lower-right corner.
const SOFT_STOP_OPACITY: f32 = 0.6;
/// Background halo behind the head.
const HALO_OPACITY: f32 = 0.35;
/// Cheek overlay.
const CHEEK_OPACITY: f32 = 0.5;

const INK: &str = "#1f2933";
const FACE_FILL: &str = "#fdf8f3";
const SNOUT_FILL: &str = "#f0b4a6";

/// Vertical axis of the face; the second ear is mirrored across it.
const FACE_AXIS_X: u32 = 58;

/// Rendered SVG markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Illustration(String);

impl Illustration {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Illustration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn ear_fragment(ear: EarShape) -> &'static str {
    match ear {
        EarShape::Pointy => r#"<path d="M18 20 L36 6 L48 22 Z" />"#,
        EarShape::Round => r#"<circle cx="24" cy="16" r="10" />"#,
        EarShape::Long => r#"<path d="M20 10 Q24 2 30 10 L28 36 Q24 42 20 36 Z" />"#,
        EarShape::Antler => {
            r#"<path d="M18 22 Q12 10 20 6 Q16 14 24 18 Q20 12 26 8 Q22 16 30 20" />"#
        }
        EarShape::Horn => r#"<path d="M18 26 Q14 12 24 8 Q18 16 22 26 Z" />"#,
        EarShape::Owl => r#"<path d="M16 28 Q8 18 18 10 Q14 20 22 28 Z" />"#,
    }
}

fn marking_fragment(marking: Marking) -> &'static str {
    match marking {
        Marking::Mask => r#"<path d="M36 44 Q56 28 76 44 Q68 62 56 64 Q44 62 36 44 Z" />"#,
        Marking::Stripes => r#"<path d="M30 52 H46 M66 52 H82 M42 36 H70" />"#,
        Marking::Spots => r#"<circle cx="42" cy="60" r="5" /><circle cx="70" cy="58" r="4" />"#,
        Marking::Mane => r#"<path d="M20 52 Q48 20 76 52 Q70 86 48 90 Q26 86 20 52 Z" />"#,
        Marking::Cheek => r#"<circle cx="36" cy="66" r="6" /><circle cx="80" cy="66" r="6" />"#,
        Marking::None => "",
    }
}

fn snout_fragment(snout: Snout) -> &'static str {
    match snout {
        Snout::Long => r#"<path d="M46 62 Q58 54 70 62 Q66 76 58 78 Q50 76 46 62 Z" />"#,
        Snout::Short => r#"<ellipse cx="58" cy="66" rx="12" ry="9" />"#,
    }
}

fn eye_fragment(eye: EyeShape) -> &'static str {
    match eye {
        EyeShape::Almond => {
            r#"<ellipse cx="48" cy="60" rx="6" ry="3" /><ellipse cx="68" cy="60" rx="6" ry="3" />"#
        }
        EyeShape::Round => r#"<circle cx="48" cy="60" r="4" /><circle cx="68" cy="60" r="4" />"#,
    }
}

fn brow_fragment(brow: BrowShape) -> &'static str {
    match brow {
        BrowShape::Sharp => r#"<path d="M40 52 L52 50" /><path d="M64 50 L76 52" />"#,
        BrowShape::Soft => r#"<path d="M40 52 Q50 48 60 50" /><path d="M56 50 Q66 48 76 52" />"#,
    }
}

fn nose_fragment(nose: NoseShape) -> &'static str {
    match nose {
        NoseShape::Triangle => r#"<path d="M58 66 L54 72 L62 72 Z" />"#,
        NoseShape::Button => r#"<circle cx="58" cy="68" r="4" />"#,
    }
}

fn mouth_fragment(mouth: MouthShape) -> &'static str {
    match mouth {
        MouthShape::Straight => r#"<path d="M50 76 H66" />"#,
        MouthShape::Smile => r#"<path d="M50 76 Q58 82 66 76" />"#,
    }
}

fn cheek_fragment(cheek: CheekAccessory) -> &'static str {
    match cheek {
        CheekAccessory::Blush => {
            r#"<circle cx="40" cy="70" r="5" /><circle cx="76" cy="70" r="5" />"#
        }
        CheekAccessory::None => "",
    }
}

fn whisker_fragment(whiskers: bool) -> &'static str {
    if whiskers {
        r#"<path d="M30 66 H44 M30 72 H44 M72 66 H86 M72 72 H86" />"#
    } else {
        ""
    }
}

/// Gradient id derived from the inputs.
///
/// Illustrations inlined side by side in one document need distinct ids;
/// hashing keeps identical inputs byte-identical.
fn gradient_id(traits: &TraitSet, accent: &AccentColor) -> String {
    let mut hasher = Sha256::new();
    hasher.update(accent.as_str());
    for part in [
        traits.ear.as_str(),
        traits.marking.as_str(),
        traits.snout.as_str(),
        traits.eye.as_str(),
        traits.nose.as_str(),
        traits.mouth.as_str(),
        traits.cheek.as_str(),
        traits.brow.as_str(),
        if traits.whiskers { "whiskers" } else { "bare" },
    ] {
        hasher.update(b"|");
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let suffix: String = digest[..4].iter().map(|b| format!("{b:02x}")).collect();
    format!("accent-{suffix}")
}

/// Render one archetype illustration.
pub fn synthesize(traits: &TraitSet, accent: &AccentColor) -> Illustration {
    let id = gradient_id(traits, accent);
    let ear = ear_fragment(traits.ear);
    let mirror = FACE_AXIS_X * 2;

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" class="animal-illustration" viewBox="0 0 120 120" aria-hidden="true">
  <defs>
    <linearGradient id="{id}" x1="0" x2="1" y1="0" y2="1">
      <stop offset="0%" stop-color="{accent}" stop-opacity="{STRONG_OPACITY}" />
      <stop offset="100%" stop-color="{accent}" stop-opacity="{SOFT_STOP_OPACITY}" />
    </linearGradient>
  </defs>
  <circle cx="58" cy="62" r="40" fill="url(#{id})" opacity="{HALO_OPACITY}" />
  <g fill="url(#{id})" opacity="{STRONG_OPACITY}">
    {ear}
    <g transform="translate({mirror},0) scale(-1,1)">
      {ear}
    </g>
  </g>
  <circle cx="58" cy="64" r="34" fill="{FACE_FILL}" stroke="{accent}" stroke-width="2" />
  <g fill="none" stroke="{accent}" stroke-width="3" stroke-linecap="round">
    {marking}
  </g>
  <g fill="none" stroke="{INK}" stroke-width="2" stroke-linecap="round">
    {brow}
  </g>
  <g fill="{INK}">
    {eye}
  </g>
  <g fill="{SNOUT_FILL}" stroke="{accent}" stroke-width="2">
    {snout}
  </g>
  <g fill="{INK}" stroke="{INK}" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
    {nose}
  </g>
  <g fill="none" stroke="{INK}" stroke-width="2" stroke-linecap="round">
    {mouth}
    {whiskers}
  </g>
  <g fill="{accent}" opacity="{CHEEK_OPACITY}">
    {cheek}
  </g>
</svg>
"##,
        marking = marking_fragment(traits.marking),
        brow = brow_fragment(traits.brow),
        eye = eye_fragment(traits.eye),
        snout = snout_fragment(traits.snout),
        nose = nose_fragment(traits.nose),
        mouth = mouth_fragment(traits.mouth),
        whiskers = whisker_fragment(traits.whiskers),
        cheek = cheek_fragment(traits.cheek),
    );

    Illustration(svg)
}

/// Render every archetype in catalog order.
pub fn render_gallery(registry: &Registry) -> Vec<(&ArchetypeProfile, Illustration)> {
    registry
        .profiles()
        .iter()
        .map(|p| (p, synthesize(&p.traits, &p.accent)))
        .collect()
}
