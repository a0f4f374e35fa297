//! Voice catalog

use serde::Serialize;

/// A selectable synthesis voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    #[serde(rename = "ShortName")]
    pub short_name: &'static str,
    #[serde(rename = "FriendlyName")]
    pub friendly_name: &'static str,
}

const fn voice(short_name: &'static str, friendly_name: &'static str) -> Voice {
    Voice {
        short_name,
        friendly_name,
    }
}

/// Curated neural voices offered to readers
pub const VOICES: &[Voice] = &[
    voice("es-AR-TomasNeural", "Tomás (Argentina)"),
    voice("es-AR-ElenaNeural", "Elena (Argentina)"),
    voice("es-MX-JorgeNeural", "Jorge (México)"),
    voice("es-MX-DaliaNeural", "Dalia (México)"),
    voice("es-CO-GonzaloNeural", "Gonzalo (Colombia)"),
    voice("es-CO-SalomeNeural", "Salome (Colombia)"),
    voice("es-ES-AlvaroNeural", "Álvaro (España)"),
    voice("es-ES-ElviraNeural", "Elvira (España)"),
    voice("es-US-AlonsoNeural", "Alonso (EE.UU. Latino)"),
    voice("es-US-PalomaNeural", "Paloma (EE.UU. Latino)"),
    voice("es-VE-SebastianNeural", "Sebastián (Venezuela)"),
    voice("es-VE-PaolaNeural", "Paola (Venezuela)"),
    voice("en-US-GuyNeural", "Guy (English US)"),
    voice("en-US-JennyNeural", "Jenny (English US)"),
    voice("en-GB-RyanNeural", "Ryan (English UK)"),
    voice("en-GB-SoniaNeural", "Sonia (English UK)"),
    voice("pt-BR-AntonioNeural", "Antônio (Brasil)"),
    voice("pt-BR-FranciscaNeural", "Francisca (Brasil)"),
    voice("fr-FR-HenriNeural", "Henri (France)"),
    voice("fr-FR-DeniseNeural", "Denise (France)"),
    voice("it-IT-DiegoNeural", "Diego (Italy)"),
    voice("it-IT-ElsaNeural", "Elsa (Italy)"),
    voice("de-DE-ConradNeural", "Conrad (Germany)"),
    voice("de-DE-KatjaNeural", "Katja (Germany)"),
];
