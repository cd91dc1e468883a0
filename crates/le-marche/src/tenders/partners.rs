use serde::{Deserialize, Serialize};

use super::domain::{AmountRange, Tender};
use crate::perimeters::{Perimeter, PerimeterKind, PerimeterRegistry};

/// Partner organisation receiving a copy of dispatched tenders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerShareTender {
    pub name: String,
    /// Subscribed perimeter slugs. Empty means nationwide.
    #[serde(default)]
    pub perimeters: Vec<String>,
    /// Largest tender bracket the partner follows. `None` follows every amount.
    #[serde(default)]
    pub amount_in: Option<AmountRange>,
    #[serde(default)]
    pub contact_emails: Vec<String>,
}

impl PartnerShareTender {
    pub fn matches(&self, tender: &Tender, registry: &PerimeterRegistry) -> bool {
        self.matches_amount(tender) && self.matches_perimeters(tender, registry)
    }

    fn matches_amount(&self, tender: &Tender) -> bool {
        match (self.amount_in, tender.amount) {
            (Some(ceiling), Some(amount)) => ceiling >= amount,
            _ => true,
        }
    }

    fn matches_perimeters(&self, tender: &Tender, registry: &PerimeterRegistry) -> bool {
        if self.perimeters.is_empty() {
            return true;
        }
        let subscribed: Vec<&Perimeter> = self
            .perimeters
            .iter()
            .filter_map(|slug| registry.get(slug))
            .collect();
        if subscribed
            .iter()
            .any(|perimeter| perimeter.kind == PerimeterKind::Country)
        {
            return true;
        }
        if tender.is_country_area {
            return false;
        }

        let targeted: Vec<&Perimeter> = tender
            .perimeters
            .iter()
            .chain(tender.location.iter())
            .filter_map(|slug| registry.get(slug))
            .collect();
        subscribed
            .iter()
            .any(|partner| targeted.iter().any(|perimeter| partner.contains(perimeter)))
    }
}

/// Contact lists of the partners following this tender, in partner order.
pub fn partner_email_lists(
    partners: &[PartnerShareTender],
    tender: &Tender,
    registry: &PerimeterRegistry,
) -> Vec<Vec<String>> {
    partners
        .iter()
        .filter(|partner| !partner.contact_emails.is_empty())
        .filter(|partner| partner.matches(tender, registry))
        .map(|partner| partner.contact_emails.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::perimeters;
    use crate::tenders::domain::TenderDraft;
    use chrono::Utc;

    fn tender(perimeters: &[&str], is_country_area: bool, amount: Option<AmountRange>) -> Tender {
        Tender::from_draft(
            TenderDraft {
                title: "Blanchisserie".to_string(),
                author: "acheteur@chu.fr".to_string(),
                sectors: vec!["blanchisserie".to_string()],
                perimeters: perimeters.iter().map(|slug| slug.to_string()).collect(),
                location: None,
                distance_location_km: None,
                is_country_area,
                include_country_area: false,
                kinds: Vec::new(),
                service_types: Vec::new(),
                deadline: None,
                amount,
            },
            Utc::now(),
        )
    }

    fn partner(name: &str, perimeters: &[&str], amount_in: Option<AmountRange>) -> PartnerShareTender {
        PartnerShareTender {
            name: name.to_string(),
            perimeters: perimeters.iter().map(|slug| slug.to_string()).collect(),
            amount_in,
            contact_emails: vec![format!("contact@{name}.fr")],
        }
    }

    #[test]
    fn perimeter_subscription_follows_containment() {
        let registry = perimeters();
        let grenoble = tender(&["grenoble-38"], false, None);

        assert!(partner("isere", &["isere"], None).matches(&grenoble, &registry));
        assert!(partner("aura", &["auvergne-rhone-alpes"], None).matches(&grenoble, &registry));
        assert!(partner("national", &[], None).matches(&grenoble, &registry));
        assert!(partner("france", &["france"], None).matches(&grenoble, &registry));
        assert!(!partner("paris", &["paris"], None).matches(&grenoble, &registry));

        let whole_region = tender(&["auvergne-rhone-alpes"], false, None);
        assert!(!partner("isere", &["isere"], None).matches(&whole_region, &registry));
    }

    #[test]
    fn nationwide_tenders_only_reach_nationwide_partners() {
        let registry = perimeters();
        let national = tender(&[], true, None);
        assert!(partner("national", &[], None).matches(&national, &registry));
        assert!(partner("france", &["france"], None).matches(&national, &registry));
        assert!(!partner("isere", &["isere"], None).matches(&national, &registry));
    }

    #[test]
    fn amount_ceiling_filters_larger_tenders() {
        let registry = perimeters();
        let large = tender(&["grenoble-38"], false, Some(AmountRange::From250kTo500k));
        let partners = vec![
            partner("small", &[], Some(AmountRange::From15kTo100k)),
            partner("large", &[], Some(AmountRange::Over1m)),
            partner("any", &[], None),
        ];
        let lists = partner_email_lists(&partners, &large, &registry);
        assert_eq!(
            lists,
            vec![
                vec!["contact@large.fr".to_string()],
                vec!["contact@any.fr".to_string()]
            ]
        );

        let undeclared = tender(&["grenoble-38"], false, None);
        assert_eq!(partner_email_lists(&partners, &undeclared, &registry).len(), 3);
    }
}
