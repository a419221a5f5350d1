//! Outgoing message texts.

use mesabot_core::{BusinessHours, PartySize, ReservationRecord};

pub const HELP: &str = "Para hacer una reserva, por favor escribe 'reservar' o 'mesa', para ver el menú, por favor escriba 'menú'.";
pub const ASK_DATE: &str = "¡Genial!, ¿Para qué fecha quieres la reserva? (formato: DD/MM/AAAA)";
pub const DATE_FORMAT: &str = "❌ Formato de fecha inválido. Usa DD/MM/AAAA:";
pub const DATE_IN_PAST: &str =
    "❌ La fecha no puede ser en el pasado. Por favor, ingresa una fecha válida (DD/MM/AAAA):";
pub const ASK_TIME: &str = "Perfecto. ¿A qué hora quieres reservar? (formato 24h, ej: 20:30)";
pub const TIME_FORMAT: &str = "❌ Hora inválida. Usa formato 24h (ej: 20:30):";
pub const ASK_NAME: &str = "Casi listo. ¿Podrías proporcionarme tu nombre para la reserva?";
pub const NAME_EMPTY: &str = "❌ Por favor, escribe el nombre para la reserva:";
pub const INTERNAL_ERROR: &str =
    "❌ Lo sentimos, ha ocurrido un error. Por favor, inténtalo de nuevo en unos minutos.";

#[must_use]
pub fn greeting(restaurant: &str) -> String {
    format!("¡Hola! Bienvenido(a) al {restaurant}. ¿En qué puedo ayudarte hoy?")
}

#[must_use]
pub fn ask_party_size() -> String {
    format!(
        "¡Perfecto! ¿Para cuántas personas quieres reservar? ({}-{})",
        PartySize::MIN,
        PartySize::MAX
    )
}

#[must_use]
pub fn party_size_too_large() -> String {
    format!(
        "❌ Máximo {max} personas. Escribe un número ({}-{max}):",
        PartySize::MIN,
        max = PartySize::MAX
    )
}

#[must_use]
pub fn party_size_invalid() -> String {
    format!(
        "❌ Por favor, escribe un número válido de personas ({}-{}):",
        PartySize::MIN,
        PartySize::MAX
    )
}

#[must_use]
pub fn outside_hours(hours: &BusinessHours) -> String {
    format!(
        "❌ Lo siento, nuestro horario de atención es de {} a {}. Por favor, elige una hora dentro de este rango:",
        hours.opens_display(),
        hours.closes_display()
    )
}

#[must_use]
pub fn confirmation(record: &ReservationRecord, restaurant: &str) -> String {
    format!(
        "✅ ¡Reserva confirmada!\n\
         Nombre: {}\n\
         Personas: {}\n\
         Fecha: {}\n\
         Hora: {}\n\
         Gracias por elegir {restaurant}. ¡Te esperamos!",
        record.name,
        record.party_size,
        record.date_display(),
        record.time_display(),
    )
}
