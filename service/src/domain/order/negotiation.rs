//! [`Negotiation`] of repair terms between an [`Order`]'s parties.

use common::{define_kind, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error};
use serde::{Deserialize, Serialize};

use crate::domain::{safe_zone, user, SafeZone};

#[cfg(doc)]
use super::Order;
#[cfg(doc)]
use common::DateTime;

/// Agreed-upon or proposed terms of an [`Order`].
///
/// Every facet remembers which party put it on the table, so acceptance
/// can be restricted to the counter-party.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Negotiation {
    /// Proposed [`Parts`] arrangement.
    pub parts: Parts,

    /// Proposed [`Price`].
    pub price: Price,

    /// Proposed [`Meetup`] arrangement.
    pub meetup: Meetup,

    /// Party who put the current terms on the table.
    ///
    /// Only the counter-party may accept them.
    pub proposed_by: user::Id,

    /// Whether both parties have agreed on all the facets.
    ///
    /// Once `true`, it never flips back: any new terms start a fresh
    /// [`Negotiation`].
    pub all_confirmed: bool,
}

impl Negotiation {
    /// Indicates whether the [`User`] with the provided [`user::Id`]
    /// proposed any facet of this [`Negotiation`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn has_facet_from(&self, user: user::Id) -> bool {
        self.parts.proposed_by == user
            || self.price.proposed_by == user
            || self.meetup.proposed_by == user
    }

    /// Indicates whether the provided [`Draft`] restates the terms of this
    /// [`Negotiation`] without changing anything.
    #[must_use]
    pub fn matches(&self, draft: &Draft) -> bool {
        draft.price == Some(self.price.proposed)
            && draft.parts == Some(self.parts.responsibility)
            && draft.notes == self.parts.notes
            && draft.zone.as_ref() == Some(&self.meetup.zone.id)
            && draft.at == Some(self.meetup.at)
    }
}

/// Parts arrangement facet of a [`Negotiation`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Parts {
    /// Who is responsible for sourcing the parts.
    pub responsibility: PartsResponsibility,

    /// Free-form [`Notes`] about the parts.
    pub notes: Option<Notes>,

    /// Party that proposed this arrangement.
    pub proposed_by: user::Id,
}

/// Price facet of a [`Negotiation`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Price {
    /// Proposed price.
    pub proposed: Money,

    /// Party that proposed this price.
    pub proposed_by: user::Id,
}

/// Meetup facet of a [`Negotiation`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Meetup {
    /// [`SafeZone`] where the handoff happens.
    pub zone: SafeZone,

    /// [`DateTime`] of the meetup.
    pub at: MeetupDateTime,

    /// Party that proposed this arrangement.
    pub proposed_by: user::Id,
}

define_kind! {
    #[doc = "Who sources the parts needed for a repair."]
    enum PartsResponsibility {
        #[doc = "Fixer brings the parts."]
        Fixer = 1,

        #[doc = "Customer provides the parts."]
        Customer = 2,

        #[doc = "No parts are needed."]
        NotNeeded = 3,
    }
}

/// Free-form notes about a parts arrangement.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        let trimmed = notes.trim();
        (!trimmed.is_empty() && trimmed.len() <= 2048)
            .then(|| Self(trimmed.to_owned()))
    }
}

/// [`DateTime`] of a [`Meetup`].
pub type MeetupDateTime = DateTimeOf<Meetup>;

/// Incomplete terms being put together by one of the parties.
///
/// Turns into a [`Negotiation`] via [`Draft::propose()`].
#[derive(Clone, Debug, Default)]
pub struct Draft {
    /// Proposed price.
    pub price: Option<Money>,

    /// Proposed [`PartsResponsibility`].
    pub parts: Option<PartsResponsibility>,

    /// Free-form [`Notes`] about the parts.
    pub notes: Option<Notes>,

    /// [`safe_zone::Id`] of the proposed meetup location.
    pub zone: Option<safe_zone::Id>,

    /// Proposed meetup [`DateTime`].
    pub at: Option<MeetupDateTime>,
}

impl Draft {
    /// Turns this [`Draft`] into a full [`Negotiation`] proposed by the
    /// given party.
    ///
    /// Facets restating the `previous` terms keep their original
    /// proposer, so a counter-proposal only claims what it changes.
    ///
    /// # Errors
    ///
    /// If any facet is missing or invalid.
    pub fn propose(
        self,
        proposer: user::Id,
        previous: Option<&Negotiation>,
    ) -> Result<Negotiation, InvalidDraft> {
        let price = self.price.ok_or(InvalidDraft::MissingPrice)?;
        if !price.is_positive() {
            return Err(InvalidDraft::NonPositivePrice);
        }
        let responsibility =
            self.parts.ok_or(InvalidDraft::MissingPartsResponsibility)?;
        let zone_id = self.zone.ok_or(InvalidDraft::MissingZone)?;
        let at = self.at.ok_or(InvalidDraft::MissingDate)?;

        let zone = safe_zone::by_id(&zone_id)
            .ok_or(InvalidDraft::UnknownZone)?;
        if !zone.is_available {
            return Err(InvalidDraft::UnavailableZone);
        }

        let facet_proposer = |same: bool, prev: Option<user::Id>| {
            prev.filter(|_| same).unwrap_or(proposer)
        };

        Ok(Negotiation {
            parts: Parts {
                responsibility,
                notes: self.notes.clone(),
                proposed_by: facet_proposer(
                    previous.is_some_and(|p| {
                        p.parts.responsibility == responsibility
                            && p.parts.notes == self.notes
                    }),
                    previous.map(|p| p.parts.proposed_by),
                ),
            },
            price: Price {
                proposed: price,
                proposed_by: facet_proposer(
                    previous.is_some_and(|p| p.price.proposed == price),
                    previous.map(|p| p.price.proposed_by),
                ),
            },
            meetup: Meetup {
                zone: zone.clone(),
                at,
                proposed_by: facet_proposer(
                    previous.is_some_and(|p| {
                        p.meetup.zone.id == zone.id && p.meetup.at == at
                    }),
                    previous.map(|p| p.meetup.proposed_by),
                ),
            },
            proposed_by: proposer,
            all_confirmed: false,
        })
    }
}

/// Error of a [`Draft`] failing to form a valid [`Negotiation`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum InvalidDraft {
    /// No price was proposed.
    #[display("no price proposed")]
    MissingPrice,

    /// The proposed price is zero or negative.
    #[display("proposed price is not positive")]
    NonPositivePrice,

    /// No parts arrangement was proposed.
    #[display("no parts responsibility proposed")]
    MissingPartsResponsibility,

    /// No meetup location was proposed.
    #[display("no meetup location proposed")]
    MissingZone,

    /// No meetup date was proposed.
    #[display("no meetup date proposed")]
    MissingDate,

    /// The proposed meetup location is not in the catalog.
    #[display("unknown meetup location")]
    UnknownZone,

    /// The proposed meetup location is not available.
    #[display("unavailable meetup location")]
    UnavailableZone,
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use crate::domain::user;

    use super::{Draft, InvalidDraft, MeetupDateTime, PartsResponsibility};

    fn eur(amount: i64) -> Money {
        Money::new(Decimal::from(amount), common::money::Currency::Eur)
    }

    fn draft(price: i64) -> Draft {
        Draft {
            price: Some(eur(price)),
            parts: Some(PartsResponsibility::Fixer),
            notes: None,
            zone: Some("sz-1".into()),
            at: Some(MeetupDateTime::now()),
        }
    }

    #[test]
    fn proposes_complete_draft() {
        let fixer = user::Id::new();

        let terms = draft(45).propose(fixer, None).unwrap();

        assert_eq!(terms.price.proposed, eur(45));
        assert_eq!(terms.price.proposed_by, fixer);
        assert_eq!(terms.parts.proposed_by, fixer);
        assert_eq!(terms.meetup.proposed_by, fixer);
        assert!(!terms.all_confirmed);
    }

    #[test]
    fn rejects_incomplete_drafts() {
        let fixer = user::Id::new();

        assert_eq!(
            Draft {
                price: None,
                ..draft(45)
            }
            .propose(fixer, None)
            .unwrap_err(),
            InvalidDraft::MissingPrice,
        );
        assert_eq!(
            draft(0).propose(fixer, None).unwrap_err(),
            InvalidDraft::NonPositivePrice,
        );
        assert_eq!(
            Draft {
                zone: Some("sz-404".into()),
                ..draft(45)
            }
            .propose(fixer, None)
            .unwrap_err(),
            InvalidDraft::UnknownZone,
        );
        assert_eq!(
            Draft {
                zone: Some("sz-5".into()),
                ..draft(45)
            }
            .propose(fixer, None)
            .unwrap_err(),
            InvalidDraft::UnavailableZone,
        );
    }

    #[test]
    fn counter_claims_only_changed_facets() {
        let fixer = user::Id::new();
        let customer = user::Id::new();

        let first = draft(45).propose(fixer, None).unwrap();
        let counter = Draft {
            price: Some(eur(46)),
            at: Some(first.meetup.at),
            ..draft(45)
        }
        .propose(customer, Some(&first))
        .unwrap();

        assert_eq!(counter.proposed_by, customer);
        assert_eq!(counter.price.proposed_by, customer);
        assert_eq!(counter.parts.proposed_by, fixer);
        assert_eq!(counter.meetup.proposed_by, fixer);
        assert!(counter.has_facet_from(fixer));
        assert!(counter.has_facet_from(customer));
    }

    #[test]
    fn detects_restated_terms() {
        let fixer = user::Id::new();
        let at = MeetupDateTime::now();

        let first = Draft {
            at: Some(at),
            ..draft(45)
        }
        .propose(fixer, None)
        .unwrap();

        assert!(first.matches(&Draft {
            at: Some(at),
            ..draft(45)
        }));
        assert!(!first.matches(&Draft {
            at: Some(at),
            ..draft(46)
        }));
    }
}
