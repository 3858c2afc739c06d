//! Closed choice lists stored as short strings.
//!
//! Each enum serializes to (and parses from) its stored value, is stored in a
//! `VARCHAR` column guarded by a `CHECK` constraint, and exposes the
//! human-readable label shown by the operator console.

use serde::Serialize;

/// Returned when a string is not one of an enum's stored values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{value}\" is not a valid choice.")]
pub struct ParseChoiceError {
    pub value: String,
}

/// A `(value, label)` pair as presented to form renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! define_choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident($val:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $val),+
                }
            }

            /// The display label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// All `(value, label)` pairs, in declaration order.
            pub fn choices() -> Vec<Choice> {
                Self::ALL
                    .iter()
                    .map(|c| Choice { value: c.as_str(), label: c.label() })
                    .collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseChoiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($val => Ok($name::$variant),)+
                    _ => Err(ParseChoiceError { value: s.to_string() }),
                }
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

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse::<$name>()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

define_choice_enum! {
    /// Account role tag.
    UserType {
        SuperAdmin("super_admin", "SUPER ADMIN"),
        Lecturer("dosen", "USER DOSEN"),
        Student("mahasiswa", "USER MAHASISWA"),
    }
}

impl Default for UserType {
    fn default() -> Self {
        UserType::Student
    }
}

define_choice_enum! {
    /// Program of study. Only one programme is offered today.
    StudyProgram {
        DigitalBusiness("Program Studi Bisnis Digital", "Program Studi Bisnis Digital"),
    }
}

define_choice_enum! {
    Gender {
        Male("Laki-laki", "Laki-laki"),
        Female("Perempuan", "Perempuan"),
    }
}

define_choice_enum! {
    /// Lecturer academic rank (jabatan akademik).
    AcademicRank {
        AssistantExpert("Asisten Ahli", "Asisten Ahli"),
        Lecturer("Lektor", "Lektor"),
        SeniorLecturer("Lektor Kepala", "Lektor Kepala"),
        Professor("Profesor", "Profesor"),
    }
}

define_choice_enum! {
    /// Highest completed degree level.
    EducationLevel {
        S1("S1", "S1"),
        S2("S2", "S2"),
        S3("S3", "S3"),
    }
}

impl Default for EducationLevel {
    fn default() -> Self {
        EducationLevel::S2
    }
}

define_choice_enum! {
    /// Lecturer employment status (status kepegawaian).
    EmploymentStatus {
        CivilServant("PNS", "PNS"),
        NonCivilServant("Non-PNS", "Non-PNS"),
        Contract("Kontrak", "Kontrak"),
    }
}

impl Default for EmploymentStatus {
    fn default() -> Self {
        EmploymentStatus::CivilServant
    }
}

define_choice_enum! {
    /// Student class section.
    ClassSection {
        A("A", "A"),
        B("B", "B"),
        C("C", "C"),
        D("D", "D"),
        E("E", "E"),
        F("F", "F"),
        G("G", "G"),
    }
}

define_choice_enum! {
    /// Student enrolment status. Transitions between values are unrestricted.
    StudentStatus {
        Active("Aktif", "Aktif"),
        OnLeave("Cuti", "Cuti"),
        Inactive("Non-Aktif", "Non-Aktif"),
        Graduated("Lulus", "Lulus"),
        DroppedOut("DO", "Drop Out"),
    }
}

impl Default for StudentStatus {
    fn default() -> Self {
        StudentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_round_trips_through_its_stored_value() {
        for ut in UserType::ALL {
            assert_eq!(ut.as_str().parse::<UserType>().unwrap(), *ut);
        }
        assert_eq!(UserType::default(), UserType::Student);
        assert_eq!(UserType::Lecturer.as_str(), "dosen");
    }

    #[test]
    fn unknown_value_is_rejected_with_choice_message() {
        let err = "dean".parse::<UserType>().unwrap_err();
        assert_eq!(err.to_string(), "\"dean\" is not a valid choice.");
    }

    #[test]
    fn serde_uses_stored_value_not_variant_name() {
        let json = serde_json::to_string(&StudentStatus::DroppedOut).unwrap();
        assert_eq!(json, "\"DO\"");

        let parsed: EmploymentStatus = serde_json::from_str("\"Non-PNS\"").unwrap();
        assert_eq!(parsed, EmploymentStatus::NonCivilServant);

        let bad = serde_json::from_str::<Gender>("\"male\"");
        assert!(bad.is_err());
    }

    #[test]
    fn labels_may_differ_from_values() {
        assert_eq!(StudentStatus::DroppedOut.label(), "Drop Out");
        assert_eq!(UserType::SuperAdmin.label(), "SUPER ADMIN");
    }

    #[test]
    fn defaults_match_column_defaults() {
        assert_eq!(EducationLevel::default().as_str(), "S2");
        assert_eq!(EmploymentStatus::default().as_str(), "PNS");
        assert_eq!(StudentStatus::default().as_str(), "Aktif");
    }

    #[test]
    fn class_sections_cover_a_to_g() {
        let values: Vec<_> = ClassSection::choices().iter().map(|c| c.value).collect();
        assert_eq!(values, ["A", "B", "C", "D", "E", "F", "G"]);
    }
}
