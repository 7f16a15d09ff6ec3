//! [`SafeZone`] definitions.
//!
//! Safe Zones are pre-approved public meetup locations for in-person
//! handoffs. The catalog is static reference data: the core only records
//! which zone an order references and never mutates the catalog itself.

use std::sync::LazyLock;

use derive_more::{AsRef, Display, From, Into};
use serde::{Deserialize, Serialize};

/// Pre-approved public meetup location.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SafeZone {
    /// ID of this [`SafeZone`].
    pub id: Id,

    /// Display name of this [`SafeZone`].
    pub name: Name,

    /// Postal address of this [`SafeZone`].
    pub address: Address,

    /// Geographic [`Coordinates`] of this [`SafeZone`].
    pub coordinates: Coordinates,

    /// Whether this [`SafeZone`] is currently available for meetups.
    pub is_available: bool,
}

/// ID of a [`SafeZone`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Id(String);

/// Display name of a [`SafeZone`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Name(String);

/// Postal address of a [`SafeZone`].
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, From, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Address(String);

/// Geographic coordinates of a [`SafeZone`].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Coordinates {
    /// Latitude, in degrees.
    pub lat: f64,

    /// Longitude, in degrees.
    pub lng: f64,
}

/// Returns the static [`SafeZone`] catalog.
#[must_use]
pub fn catalog() -> &'static [SafeZone] {
    static CATALOG: LazyLock<Vec<SafeZone>> = LazyLock::new(|| {
        vec![
            SafeZone {
                id: "sz-1".into(),
                name: "University Library - Main Entrance".into(),
                address: "Dolivostrasse 15, 64293 Darmstadt".into(),
                coordinates: Coordinates {
                    lat: 49.8728,
                    lng: 8.6512,
                },
                is_available: true,
            },
            SafeZone {
                id: "sz-2".into(),
                name: "Campus Canteen - Outdoor Area".into(),
                address: "Alexanderstrasse 4, 64283 Darmstadt".into(),
                coordinates: Coordinates {
                    lat: 49.8745,
                    lng: 8.6542,
                },
                is_available: true,
            },
            SafeZone {
                id: "sz-3".into(),
                name: "Lichtwiese - Canteen Lounge".into(),
                address: "Petersenstrasse 32, 64287 Darmstadt".into(),
                coordinates: Coordinates {
                    lat: 49.8634,
                    lng: 8.6789,
                },
                is_available: true,
            },
            SafeZone {
                id: "sz-4".into(),
                name: "Auditorium - Foyer".into(),
                address: "Karolinenplatz 5, 64289 Darmstadt".into(),
                coordinates: Coordinates {
                    lat: 49.8767,
                    lng: 8.6523,
                },
                is_available: true,
            },
            SafeZone {
                id: "sz-5".into(),
                name: "Palace Garden - Pavilion".into(),
                address: "Schlossgarten, 64283 Darmstadt".into(),
                coordinates: Coordinates {
                    lat: 49.8789,
                    lng: 8.6501,
                },
                is_available: false,
            },
        ]
    });

    &CATALOG
}

/// Looks up a [`SafeZone`] in the [`catalog()`] by its [`Id`].
#[must_use]
pub fn by_id(id: &Id) -> Option<&'static SafeZone> {
    catalog().iter().find(|z| &z.id == id)
}

/// Returns all the currently available [`SafeZone`]s of the [`catalog()`].
pub fn available() -> impl Iterator<Item = &'static SafeZone> {
    catalog().iter().filter(|z| z.is_available)
}

#[cfg(test)]
mod spec {
    use super::{available, by_id, catalog};

    #[test]
    fn looks_up_by_id() {
        assert_eq!(by_id(&"sz-1".into()).unwrap().id, "sz-1".into());
        assert!(by_id(&"sz-404".into()).is_none());
    }

    #[test]
    fn filters_unavailable_zones() {
        assert!(available().count() < catalog().len());
        assert!(available().all(|z| z.is_available));
    }
}
