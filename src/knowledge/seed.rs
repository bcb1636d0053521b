//! Reference data written on first start.

/// Seed services as `(name, description, price)`.
pub const SEED_SERVICES: &[(&str, &str, &str)] = &[
    (
        "AI Chatbot za sajt",
        "Pametni asistent koji odgovara kupcima 24/7 na osnovu podataka vaše firme.",
        "od 500 EUR",
    ),
    (
        "Automatizacija procesa",
        "Povezivanje AI modela sa vašim alatima radi uštede vremena na ponavljajućim zadacima.",
        "od 1000 EUR",
    ),
    (
        "AI konsultacije",
        "Analiza poslovanja i plan uvođenja veštačke inteligencije korak po korak.",
        "50 EUR/sat",
    ),
    (
        "Izrada veb sajta",
        "Moderan i brz sajt sa ugrađenim AI asistentom.",
        "od 800 EUR",
    ),
];

/// Seed company facts as `(key, value)`.
pub const SEED_COMPANY_INFO: &[(&str, &str)] = &[
    ("email", "kontakt@ai-agencija.rs"),
    ("telefon", "+381 60 123 4567"),
    ("adresa", "Bulevar oslobođenja 1, Novi Sad"),
    ("radno vreme", "Ponedeljak - Petak, 09:00 - 17:00"),
];
