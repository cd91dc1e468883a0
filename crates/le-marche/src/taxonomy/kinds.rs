use serde::{Deserialize, Serialize};

/// Parent family of a supplier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KindFamily {
    Insertion,
    Handicap,
}

impl KindFamily {
    pub const fn label(self) -> &'static str {
        match self {
            KindFamily::Insertion => "insertion",
            KindFamily::Handicap => "handicap",
        }
    }
}

/// Legal category of an inclusive supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierKind {
    Ei,
    Ai,
    Aci,
    Etti,
    Eiti,
    Geiq,
    Sep,
    Ea,
    Eatt,
    Esat,
}

impl SupplierKind {
    pub const ALL: [SupplierKind; 10] = [
        SupplierKind::Ei,
        SupplierKind::Ai,
        SupplierKind::Aci,
        SupplierKind::Etti,
        SupplierKind::Eiti,
        SupplierKind::Geiq,
        SupplierKind::Sep,
        SupplierKind::Ea,
        SupplierKind::Eatt,
        SupplierKind::Esat,
    ];

    pub const fn family(self) -> KindFamily {
        match self {
            SupplierKind::Ea | SupplierKind::Eatt | SupplierKind::Esat => KindFamily::Handicap,
            _ => KindFamily::Insertion,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            SupplierKind::Ei => "EI",
            SupplierKind::Ai => "AI",
            SupplierKind::Aci => "ACI",
            SupplierKind::Etti => "ETTI",
            SupplierKind::Eiti => "EITI",
            SupplierKind::Geiq => "GEIQ",
            SupplierKind::Sep => "SEP",
            SupplierKind::Ea => "EA",
            SupplierKind::Eatt => "EATT",
            SupplierKind::Esat => "ESAT",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SupplierKind::Ei => "Entreprise d'insertion",
            SupplierKind::Ai => "Association intermédiaire",
            SupplierKind::Aci => "Atelier chantier d'insertion",
            SupplierKind::Etti => "Entreprise de travail temporaire d'insertion",
            SupplierKind::Eiti => "Entreprise d'insertion par le travail indépendant",
            SupplierKind::Geiq => "Groupement d'employeurs pour l'insertion et la qualification",
            SupplierKind::Sep => "Produits et services réalisés en prison",
            SupplierKind::Ea => "Entreprise adaptée",
            SupplierKind::Eatt => "Entreprise adaptée de travail temporaire",
            SupplierKind::Esat => "Etablissement et service d'aide par le travail",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// What a supplier sells under an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    /// Staff secondment.
    Disp,
    /// Service provision.
    Prest,
    /// Goods production.
    Build,
}

impl ServiceType {
    pub const fn label(self) -> &'static str {
        match self {
            ServiceType::Disp => "Mise à disposition du personnel",
            ServiceType::Prest => "Prestation de services",
            ServiceType::Build => "Fabrication et commercialisation de biens",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalForm {
    Association,
    Sarl,
    Sarlu,
    Sas,
    Sasu,
    Sa,
    Eurl,
    Scop,
    Scic,
    Sem,
    Autre,
}

/// Priority-area flags a supplier address may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Territory {
    Qpv,
    Zrr,
}
