//! Archetype catalog.
//!
//! The catalog is data: a TOML list of `[[archetype]]` records embedded at
//! compile time from `contrib/archetypes.toml`. Each record carries display
//! text, an accent color, eight illustration traits and five target ratios.
//! Trait strings are resolved to closed enums once, at load time.

use crate::types::{RatioKey, RatioVector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../../contrib/archetypes.toml");

static BUILTIN: OnceLock<Registry> = OnceLock::new();

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog is empty")]
    Empty,
    #[error("duplicate archetype key: {0}")]
    DuplicateKey(String),
    #[error("archetype {key}: {source}")]
    InvalidColor { key: String, source: ColorError },
    #[error("archetype {key}: target {ratio} must be finite and non-negative, got {value}")]
    InvalidTarget {
        key: String,
        ratio: RatioKey,
        value: f64,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("accent color must be #rgb or #rrggbb, got {0:?}")]
    InvalidHex(String),
}

/// Unknown-trait handling shared by every trait enum.
///
/// Missing or empty values take the default silently; unrecognised values
/// take the default with a warning.
fn resolve_trait<T>(field: &'static str, raw: Option<&str>) -> T
where
    T: FromStr + Default,
{
    match raw.map(str::trim) {
        None | Some("") => T::default(),
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(field, value, "unknown trait value, using default");
            T::default()
        }),
    }
}

/// Define a closed trait enum with lowercase string names.
macro_rules! trait_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal, default = $default:ident,
        { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Resolve a raw catalog value, falling back to the default.
            pub fn resolve(raw: Option<&str>) -> Self {
                resolve_trait($field, raw)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} {other:?}", $field)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

trait_enum!(
    /// Ear silhouette, drawn as a mirrored pair.
    EarShape, "ear", default = Round,
    {
        Pointy => "pointy",
        Round => "round",
        Long => "long",
        Antler => "antler",
        Horn => "horn",
        Owl => "owl",
    }
);

trait_enum!(
    /// Face marking overlay.
    Marking, "marking", default = None,
    {
        Mask => "mask",
        Stripes => "stripes",
        Spots => "spots",
        Mane => "mane",
        Cheek => "cheek",
        None => "none",
    }
);

trait_enum!(Snout, "snout", default = Short, { Short => "short", Long => "long" });

trait_enum!(EyeShape, "eye", default = Round, { Round => "round", Almond => "almond" });

trait_enum!(NoseShape, "nose", default = Button, { Button => "button", Triangle => "triangle" });

trait_enum!(MouthShape, "mouth", default = Smile, { Smile => "smile", Straight => "straight" });

trait_enum!(CheekAccessory, "cheek", default = None, { None => "none", Blush => "blush" });

trait_enum!(BrowShape, "brow", default = Soft, { Soft => "soft", Sharp => "sharp" });

/// The eight discrete illustration parameters plus the whisker flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TraitSet {
    pub ear: EarShape,
    pub marking: Marking,
    pub snout: Snout,
    pub eye: EyeShape,
    pub nose: NoseShape,
    pub mouth: MouthShape,
    pub cheek: CheekAccessory,
    pub brow: BrowShape,
    pub whiskers: bool,
}

/// Validated hex color used for every accent fill and stroke.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccentColor(String);

impl AccentColor {
    pub fn parse(raw: &str) -> Result<Self, ColorError> {
        let hex = raw
            .strip_prefix('#')
            .filter(|h| matches!(h.len(), 3 | 6) && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ColorError::InvalidHex(raw.to_string()))?;
        Ok(Self(format!("#{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccentColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeProfile {
    pub key: String,
    pub name: String,
    pub description: String,
    pub accent: AccentColor,
    pub traits: TraitSet,
    pub targets: RatioVector,
}

/// On-disk shape of one `[[archetype]]` record.
#[derive(Debug, Deserialize)]
struct RawArchetype {
    key: String,
    name: String,
    #[serde(default)]
    description: String,
    accent: String,
    ear: Option<String>,
    marking: Option<String>,
    snout: Option<String>,
    eye: Option<String>,
    nose: Option<String>,
    mouth: Option<String>,
    cheek: Option<String>,
    brow: Option<String>,
    #[serde(default)]
    whiskers: bool,
    targets: RatioVector,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "archetype", default)]
    archetypes: Vec<RawArchetype>,
}

impl RawArchetype {
    fn into_profile(self) -> Result<ArchetypeProfile, RegistryError> {
        let accent = AccentColor::parse(&self.accent).map_err(|source| {
            RegistryError::InvalidColor {
                key: self.key.clone(),
                source,
            }
        })?;

        let traits = TraitSet {
            ear: EarShape::resolve(self.ear.as_deref()),
            marking: Marking::resolve(self.marking.as_deref()),
            snout: Snout::resolve(self.snout.as_deref()),
            eye: EyeShape::resolve(self.eye.as_deref()),
            nose: NoseShape::resolve(self.nose.as_deref()),
            mouth: MouthShape::resolve(self.mouth.as_deref()),
            cheek: CheekAccessory::resolve(self.cheek.as_deref()),
            brow: BrowShape::resolve(self.brow.as_deref()),
            whiskers: self.whiskers,
        };

        Ok(ArchetypeProfile {
            key: self.key,
            name: self.name,
            description: self.description,
            accent,
            traits,
            targets: self.targets,
        })
    }
}

/// Ordered, read-only archetype catalog.
///
/// Order matters: ranking ties are broken by catalog position.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: Vec<ArchetypeProfile>,
}

impl Registry {
    /// Build a registry from already-resolved profiles, enforcing key
    /// uniqueness and well-formed targets.
    pub fn new(profiles: Vec<ArchetypeProfile>) -> Result<Self, RegistryError> {
        if profiles.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.key.as_str()) {
                return Err(RegistryError::DuplicateKey(profile.key.clone()));
            }
            if let Some((ratio, value)) = profile.targets.first_invalid() {
                return Err(RegistryError::InvalidTarget {
                    key: profile.key.clone(),
                    ratio,
                    value,
                });
            }
        }

        Ok(Self { profiles })
    }

    /// Parse and validate a TOML catalog.
    pub fn from_toml_str(src: &str) -> Result<Self, RegistryError> {
        let file: CatalogFile = toml::from_str(src)?;
        let profiles = file
            .archetypes
            .into_iter()
            .map(RawArchetype::into_profile)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(profiles)
    }

    /// Load a catalog from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let src = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_toml_str(&src)?;
        tracing::info!(path = %path.display(), profiles = registry.len(), "loaded archetype catalog");
        Ok(registry)
    }

    /// The embedded catalog, parsed once per process.
    pub fn builtin() -> &'static Registry {
        BUILTIN.get_or_init(|| {
            let registry =
                Self::from_toml_str(BUILTIN_CATALOG).expect("embedded archetype catalog is valid");
            tracing::info!(profiles = registry.len(), "loaded archetype catalog");
            registry
        })
    }

    pub fn profiles(&self) -> &[ArchetypeProfile] {
        &self.profiles
    }

    pub fn get(&self, key: &str) -> Option<&ArchetypeProfile> {
        self.profiles.iter().find(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
