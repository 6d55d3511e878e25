use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: '{value}'")]
pub struct UnknownVariant {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Parsing is case-insensitive; serialization always emits the canonical string.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($s) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(UnknownVariant {
                    field: stringify!($name).into(),
                    value: s.into(),
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Classification {
    Exception => "exception",
    NewApplication => "new_application",
    SupplementaryEvidence => "supplementary_evidence",
    SupplementaryEvidenceWithOcr => "supplementary_evidence_with_ocr",
});

str_enum!(DocumentType {
    Cherished => "cherished",
    Other => "other",
    Will => "will",
    Sscs1 => "sscs1",
    Form => "form",
    Coversheet => "coversheet",
});

impl DocumentType {
    /// Human-facing name used in rejection messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cherished => "Cherished",
            Self::Other => "Other",
            Self::Will => "Will",
            Self::Sscs1 => "SSCS1",
            Self::Form => "Form",
            Self::Coversheet => "Coversheet",
        }
    }
}

str_enum!(ProcessStatus {
    Success => "SUCCESS",
    SuccessWithWarnings => "SUCCESS_WITH_WARNINGS",
    Fatal => "FATAL",
    Errors => "ERRORS",
});

str_enum!(ErrorCode {
    MetafileInvalid => "ERR_METAFILE_INVALID",
    ZipProcessingFailed => "ERR_ZIP_PROCESSING_FAILED",
});
