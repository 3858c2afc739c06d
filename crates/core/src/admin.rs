//! Operator console configuration.
//!
//! Static description of how each entity is listed, filtered, searched,
//! ordered and grouped into create/edit forms. The console handlers read
//! these definitions; they carry no behaviour of their own beyond lookups.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::error::CoreError;

pub const ENTITY_USERS: &str = "users";
pub const ENTITY_LECTURERS: &str = "lecturers";
pub const ENTITY_STUDENTS: &str = "students";

/// A titled group of form fields.
#[derive(Debug, Serialize)]
pub struct Fieldset {
    pub name: Option<&'static str>,
    pub classes: &'static [&'static str],
    pub fields: &'static [&'static str],
}

/// Listing and form configuration for one entity.
#[derive(Debug, Serialize)]
pub struct ModelAdmin {
    pub entity: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    /// Subset of `list_filter` that takes a [`DateRange`] value.
    pub date_filters: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    /// Default ordering; a `-` prefix means descending.
    pub ordering: &'static [&'static str],
    pub fieldsets: &'static [Fieldset],
    /// Creation form; `None` means the edit fieldsets are reused.
    pub add_fieldsets: Option<&'static [Fieldset]>,
    pub readonly_fields: &'static [&'static str],
}

pub const USER_ADMIN: ModelAdmin = ModelAdmin {
    entity: ENTITY_USERS,
    verbose_name: "All User",
    verbose_name_plural: "All User",
    list_display: &["username", "full_name", "email", "user_type", "is_active", "created_at"],
    list_filter: &["user_type", "is_active", "gender", "created_at"],
    date_filters: &["created_at"],
    search_fields: &["username", "full_name", "email", "phone_number"],
    ordering: &["-created_at"],
    fieldsets: &[
        Fieldset {
            name: None,
            classes: &[],
            fields: &["username", "password"],
        },
        Fieldset {
            name: Some("Personal info"),
            classes: &[],
            fields: &[
                "full_name",
                "email",
                "phone_number",
                "profile_picture",
                "tempat_lahir",
                "birth_date",
                "gender",
                "program_studi",
            ],
        },
        Fieldset {
            name: Some("Permissions"),
            classes: &[],
            fields: &["user_type", "is_active", "is_staff", "is_superuser"],
        },
        Fieldset {
            name: Some("Important dates"),
            classes: &[],
            fields: &["last_login", "date_joined"],
        },
    ],
    add_fieldsets: Some(&[Fieldset {
        name: None,
        classes: &["wide"],
        fields: &[
            "username",
            "full_name",
            "email",
            "password1",
            "password2",
            "user_type",
            "is_active",
            "is_staff",
            "is_superuser",
        ],
    }]),
    readonly_fields: &["created_at", "updated_at", "last_login", "date_joined"],
};

pub const LECTURER_ADMIN: ModelAdmin = ModelAdmin {
    entity: ENTITY_LECTURERS,
    verbose_name: "User Dosen",
    verbose_name_plural: "User Dosen",
    list_display: &[
        "user",
        "nip",
        "jabatan_akademik",
        "pendidikan_terakhir",
        "status_kepegawaian",
    ],
    list_filter: &["jabatan_akademik", "pendidikan_terakhir", "status_kepegawaian"],
    date_filters: &[],
    search_fields: &["user__full_name", "user__username", "nip", "bidang_keahlian"],
    ordering: &["user__full_name"],
    fieldsets: &[
        Fieldset {
            name: Some("User Information"),
            classes: &[],
            fields: &["user"],
        },
        Fieldset {
            name: Some("Dosen Information"),
            classes: &[],
            fields: &[
                "nip",
                "jabatan_akademik",
                "pendidikan_terakhir",
                "bidang_keahlian",
                "status_kepegawaian",
            ],
        },
    ],
    add_fieldsets: None,
    readonly_fields: &[],
};

pub const STUDENT_ADMIN: ModelAdmin = ModelAdmin {
    entity: ENTITY_STUDENTS,
    verbose_name: "User Mahasiswa",
    verbose_name_plural: "User Mahasiswa",
    list_display: &[
        "user",
        "nim",
        "angkatan",
        "semester",
        "kelas",
        "status",
        "ipk",
        "dosen_wali",
    ],
    list_filter: &["angkatan", "semester", "kelas", "status", "dosen_wali"],
    date_filters: &[],
    search_fields: &["user__full_name", "user__username", "nim"],
    ordering: &["angkatan", "kelas", "nim"],
    fieldsets: &[
        Fieldset {
            name: Some("User Information"),
            classes: &[],
            fields: &["user"],
        },
        Fieldset {
            name: Some("Mahasiswa Information"),
            classes: &[],
            fields: &[
                "nim",
                "angkatan",
                "semester",
                "kelas",
                "status",
                "ipk",
                "dosen_wali",
                "tanggal_masuk",
            ],
        },
    ],
    add_fieldsets: None,
    readonly_fields: &[],
};

/// Every registered console entity.
pub const REGISTRY: &[&ModelAdmin] = &[&USER_ADMIN, &LECTURER_ADMIN, &STUDENT_ADMIN];

/// Look up the console configuration for an entity path segment.
pub fn model_admin(entity: &str) -> Option<&'static ModelAdmin> {
    REGISTRY.iter().copied().find(|m| m.entity == entity)
}

/// One resolved ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: &'static str,
    pub descending: bool,
}

impl ModelAdmin {
    /// Fieldsets for the create form (`adding`) or the edit form.
    pub fn form_fieldsets(&self, adding: bool) -> &'static [Fieldset] {
        match (adding, self.add_fieldsets) {
            (true, Some(add)) => add,
            _ => self.fieldsets,
        }
    }

    /// Flattened field names of a form, in display order.
    pub fn form_fields(&self, adding: bool) -> Vec<&'static str> {
        self.form_fieldsets(adding)
            .iter()
            .flat_map(|fs| fs.fields.iter().copied())
            .collect()
    }

    /// Fields an operator may write through the given form.
    pub fn writable_fields(&self, adding: bool) -> Vec<&'static str> {
        self.form_fields(adding)
            .into_iter()
            .filter(|f| !self.readonly_fields.contains(f))
            .collect()
    }

    /// The configured filter named `name`, if any.
    pub fn filter_field(&self, name: &str) -> Option<&'static str> {
        self.list_filter.iter().copied().find(|f| *f == name)
    }

    pub fn is_date_filter(&self, field: &str) -> bool {
        self.date_filters.contains(&field)
    }

    /// Resolve a comma-separated `ordering` parameter, or the default ordering
    /// when `requested` is `None` or empty.
    ///
    /// Requested fields must be listing columns or default ordering fields.
    pub fn resolve_ordering(&self, requested: Option<&str>) -> Result<Vec<OrderTerm>, CoreError> {
        let requested = requested.map(str::trim).filter(|r| !r.is_empty());
        let Some(requested) = requested else {
            return Ok(self.ordering.iter().map(|o| parse_static_term(o)).collect());
        };

        requested
            .split(',')
            .map(|raw| {
                let raw = raw.trim();
                let (name, descending) = match raw.strip_prefix('-') {
                    Some(rest) => (rest, true),
                    None => (raw, false),
                };
                self.sortable_field(name)
                    .map(|field| OrderTerm { field, descending })
                    .ok_or_else(|| {
                        CoreError::invalid("ordering", format!("Cannot order by '{name}'"))
                    })
            })
            .collect()
    }

    fn sortable_field(&self, name: &str) -> Option<&'static str> {
        self.list_display
            .iter()
            .copied()
            .find(|f| *f == name)
            .or_else(|| {
                self.ordering
                    .iter()
                    .map(|o| o.trim_start_matches('-'))
                    .find(|f| *f == name)
            })
    }
}

fn parse_static_term(raw: &'static str) -> OrderTerm {
    match raw.strip_prefix('-') {
        Some(field) => OrderTerm { field, descending: true },
        None => OrderTerm { field: raw, descending: false },
    }
}

// ---------------------------------------------------------------------------
// Date range filter
// ---------------------------------------------------------------------------

/// Relative date ranges offered for timestamp filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl DateRange {
    pub const ALL: &'static [DateRange] = &[
        DateRange::Today,
        DateRange::Past7Days,
        DateRange::ThisMonth,
        DateRange::ThisYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateRange::Today => "today",
            DateRange::Past7Days => "past_7_days",
            DateRange::ThisMonth => "this_month",
            DateRange::ThisYear => "this_year",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == raw)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|r| r.as_str()).collect();
                CoreError::invalid(
                    "created_at",
                    format!("Invalid date range '{raw}'. Valid ranges: {}", valid.join(", ")),
                )
            })
    }

    /// Half-open `[start, end)` date bounds relative to `today`.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let tomorrow = today + Days::new(1);
        match self {
            DateRange::Today => (today, tomorrow),
            DateRange::Past7Days => (today - Days::new(7), tomorrow),
            DateRange::ThisMonth => {
                let start = today.with_day(1).unwrap_or(today);
                (start, start + Months::new(1))
            }
            DateRange::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (start, start + Months::new(12))
            }
        }
    }
}
