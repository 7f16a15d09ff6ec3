//! Escrowed [`Payment`] of an [`Order`] and its fee breakdown.

use std::sync::LazyLock;

use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{Display, Error};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use super::Order;
#[cfg(doc)]
use common::DateTime;

/// Commission withheld by the platform on every [`Payment`].
#[expect(unsafe_code, reason = "`10` is in range")]
const COMMISSION: Percent = unsafe { Percent::new_unchecked(Decimal::TEN) };

/// Processing fee charged by the platform on every [`Payment`].
#[expect(unsafe_code, reason = "`2` is in range")]
const TRANSACTION_FEE: Percent =
    unsafe { Percent::new_unchecked(Decimal::TWO) };

/// Money held in escrow for an [`Order`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Payment {
    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// Amount held in escrow.
    pub escrowed: Money,

    /// [`DateTime`] when the customer paid into escrow.
    pub paid_at: PaymentDateTime,

    /// [`DateTime`] when the escrow was released to the fixer.
    pub released_at: Option<ReleaseDateTime>,
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Held in escrow by the platform."]
        Escrowed = 1,

        #[doc = "Released to the fixer."]
        Released = 2,
    }
}

/// [`DateTime`] when a [`Payment`] was made.
pub type PaymentDateTime = DateTimeOf<(Payment, unit::Creation)>;

/// [`DateTime`] when a [`Payment`] was released from escrow.
pub type ReleaseDateTime = DateTimeOf<(Payment, unit::Completion)>;

/// Fee breakdown of a [`Payment`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Fees {
    /// Price of the repair itself.
    pub base: Money,

    /// Platform commission on top of the base price.
    pub commission: Money,

    /// Payment processing fee on top of the base price.
    pub transaction_fee: Money,

    /// Total amount the customer is charged.
    pub total: Money,
}

impl Fees {
    /// Calculates the [`Fees`] due on the provided base price.
    ///
    /// Each component is rounded to cents separately, with midpoints
    /// rounded away from zero, and the total is the sum of the rounded
    /// components.
    #[must_use]
    pub fn on(base: Money) -> Self {
        let commission = COMMISSION.of(base).rounded(2);
        let transaction_fee = TRANSACTION_FEE.of(base).rounded(2);
        Self {
            base,
            commission,
            transaction_fee,
            total: Money::new(
                base.amount + commission.amount + transaction_fee.amount,
                base.currency,
            ),
        }
    }
}

/// Payment method submitted by a customer.
///
/// Only validated, never stored: the core keeps no payment credentials.
#[derive(Clone, Debug)]
pub enum Method {
    /// Payment card.
    Card {
        /// Card number, spaces allowed.
        number: String,

        /// Cardholder name.
        holder: String,

        /// Expiry in `MM/YY` format.
        expiry: String,

        /// Card verification value.
        cvv: String,
    },

    /// PayPal account.
    PayPal {
        /// E-mail address of the account.
        email: String,
    },

    /// Bank transfer.
    BankTransfer {
        /// Account number (IBAN or similar), spaces allowed.
        account: String,
    },
}

impl Method {
    /// Validates this [`Method`].
    ///
    /// Card fields are checked in order: number, holder, expiry, CVV. The
    /// first failing field is reported.
    ///
    /// # Errors
    ///
    /// If any field of this [`Method`] is malformed.
    pub fn validate(&self) -> Result<(), InvalidMethod> {
        static EXPIRY: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("valid regex")
        });
        static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        match self {
            Self::Card {
                number,
                holder,
                expiry,
                cvv,
            } => {
                let digits = number.replace(' ', "");
                if digits.len() != 16
                    || !digits.chars().all(|c| c.is_ascii_digit())
                {
                    return Err(InvalidMethod::CardNumber);
                }
                if holder.trim().is_empty() {
                    return Err(InvalidMethod::Cardholder);
                }
                if !EXPIRY.is_match(expiry) {
                    return Err(InvalidMethod::CardExpiry);
                }
                if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit())
                {
                    return Err(InvalidMethod::CardCvv);
                }
                Ok(())
            }
            Self::PayPal { email } => EMAIL
                .is_match(email)
                .then_some(())
                .ok_or(InvalidMethod::PaypalEmail),
            Self::BankTransfer { account } => {
                (account.replace(' ', "").len() >= 10)
                    .then_some(())
                    .ok_or(InvalidMethod::BankAccount)
            }
        }
    }
}

/// Error of validating a payment [`Method`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum InvalidMethod {
    /// Card number is not 16 digits.
    #[display("card number must be 16 digits")]
    CardNumber,

    /// Cardholder name is empty.
    #[display("cardholder name must not be empty")]
    Cardholder,

    /// Expiry is not in `MM/YY` format.
    #[display("card expiry must be in MM/YY format")]
    CardExpiry,

    /// CVV is not 3 digits.
    #[display("card CVV must be 3 digits")]
    CardCvv,

    /// PayPal e-mail is malformed.
    #[display("PayPal e-mail is malformed")]
    PaypalEmail,

    /// Bank account number is too short.
    #[display("bank account number must be at least 10 characters")]
    BankAccount,
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money};
    use rust_decimal::Decimal;

    use super::{Fees, InvalidMethod, Method};

    fn eur(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap(), Currency::Eur)
    }

    #[test]
    fn breaks_down_fees() {
        let fees = Fees::on(eur("80"));

        assert_eq!(fees.commission, eur("8.00"));
        assert_eq!(fees.transaction_fee, eur("1.60"));
        assert_eq!(fees.total, eur("89.60"));
    }

    #[test]
    fn rounds_fee_components_separately() {
        // 10% of 45.25 is 4.525, and 2% is 0.905: both are midpoints.
        let fees = Fees::on(eur("45.25"));

        assert_eq!(fees.commission, eur("4.53"));
        assert_eq!(fees.transaction_fee, eur("0.91"));
        assert_eq!(fees.total, eur("50.69"));
    }

    #[test]
    fn strips_only_spaces_from_card_numbers() {
        let card = |number: &str| Method::Card {
            number: number.into(),
            holder: "Jane Roe".into(),
            expiry: "12/27".into(),
            cvv: "123".into(),
        };

        assert_eq!(card("1234 5678 9012 3456").validate(), Ok(()));
        assert_eq!(card("1234567890123456").validate(), Ok(()));
        assert_eq!(
            card("1234-5678-9012-3456").validate(),
            Err(InvalidMethod::CardNumber),
        );
        assert_eq!(
            card("1234 5678 9012").validate(),
            Err(InvalidMethod::CardNumber),
        );
    }

    #[test]
    fn reports_first_failing_card_field() {
        let method = Method::Card {
            number: "1234 5678 9012".into(),
            holder: " ".into(),
            expiry: "13/27".into(),
            cvv: "12".into(),
        };
        assert_eq!(method.validate(), Err(InvalidMethod::CardNumber));

        let method = Method::Card {
            number: "1234 5678 9012 3456".into(),
            holder: " ".into(),
            expiry: "13/27".into(),
            cvv: "12".into(),
        };
        assert_eq!(method.validate(), Err(InvalidMethod::Cardholder));

        let method = Method::Card {
            number: "1234 5678 9012 3456".into(),
            holder: "Jane Roe".into(),
            expiry: "13/27".into(),
            cvv: "12".into(),
        };
        assert_eq!(method.validate(), Err(InvalidMethod::CardExpiry));

        let method = Method::Card {
            number: "1234 5678 9012 3456".into(),
            holder: "Jane Roe".into(),
            expiry: "12/27".into(),
            cvv: "12".into(),
        };
        assert_eq!(method.validate(), Err(InvalidMethod::CardCvv));
    }

    #[test]
    fn validates_other_methods() {
        assert_eq!(
            Method::PayPal {
                email: "jane@example.com".into()
            }
            .validate(),
            Ok(()),
        );
        assert_eq!(
            Method::PayPal {
                email: "jane@example".into()
            }
            .validate(),
            Err(InvalidMethod::PaypalEmail),
        );
        assert_eq!(
            Method::BankTransfer {
                account: "DE89 3704 0044 0532 0130 00".into()
            }
            .validate(),
            Ok(()),
        );
        assert_eq!(
            Method::BankTransfer {
                account: "DE89 3704".into()
            }
            .validate(),
            Err(InvalidMethod::BankAccount),
        );
    }
}
