//! CSV rendering of the booking export.

use chrono::{DateTime, Utc};

use crate::domain::{BookingDetails, Error};

pub(crate) const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8;";
pub(crate) const CSV_CONTENT_DISPOSITION: &str =
    "attachment; filename=reservations_pass_culture.csv";

const HEADERS: [&str; 8] = [
    "Raison sociale du lieu",
    "Nom de l'offre",
    "Nom utilisateur",
    "Email utilisateur",
    "Date de la réservation",
    "Quantité",
    "Tarif pass Culture",
    "Statut",
];

/// Render one header line then one line per booking.
pub(crate) fn render_bookings_csv(
    bookings: &[BookingDetails],
    now: DateTime<Utc>,
) -> Result<Vec<u8>, Error> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADERS).map_err(csv_error)?;
    for details in bookings {
        let date = details
            .booking
            .date_created
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        let quantity = details.booking.quantity.to_string();
        let amount = details.booking.amount.to_string();
        writer
            .write_record([
                details.venue.name.as_str(),
                details.offer.name.as_str(),
                details.user_public_name.as_str(),
                details.user_email.as_str(),
                date.as_str(),
                quantity.as_str(),
                amount.as_str(),
                details.status_label(now),
            ])
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|error| Error::internal(format!("failed to flush booking export: {error}")))
}

fn csv_error(error: csv::Error) -> Error {
    Error::internal(format!("failed to write booking export: {error}"))
}
