//! Filter-state bookkeeping over entity-keyed records (product, insurer,
//! region, ...), independent of the raw-column filtering in [`crate::filter`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityDimension {
    Product,
    Insurer,
    ClientType,
    Region,
    State,
    City,
    Team,
}

impl EntityDimension {
    pub const ALL: [EntityDimension; 7] = [
        EntityDimension::Product,
        EntityDimension::Insurer,
        EntityDimension::ClientType,
        EntityDimension::Region,
        EntityDimension::State,
        EntityDimension::City,
        EntityDimension::Team,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EntityDimension::Product => "Products",
            EntityDimension::Insurer => "Insurers",
            EntityDimension::ClientType => "Client Types",
            EntityDimension::Region => "Regions",
            EntityDimension::State => "States",
            EntityDimension::City => "Cities",
            EntityDimension::Team => "Teams",
        }
    }
}

/// Anything that exposes entity ids per dimension can be filtered.
pub trait EntityAttributes {
    fn attribute(&self, dimension: EntityDimension) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityRecord {
    pub product: Option<String>,
    pub insurer: Option<String>,
    pub client_type: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub team: Option<String>,
    pub revenue: f64,
}

impl EntityAttributes for EntityRecord {
    fn attribute(&self, dimension: EntityDimension) -> Option<&str> {
        let v = match dimension {
            EntityDimension::Product => &self.product,
            EntityDimension::Insurer => &self.insurer,
            EntityDimension::ClientType => &self.client_type,
            EntityDimension::Region => &self.region,
            EntityDimension::State => &self.state,
            EntityDimension::City => &self.city,
            EntityDimension::Team => &self.team,
        };
        v.as_deref()
    }
}

/// Selected entity ids per dimension. `None` models a dimension that was
/// never initialised; both `None` and an empty list are inactive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
}

impl FilterState {
    pub fn selected(&self, dimension: EntityDimension) -> &[String] {
        self.slot(dimension).as_deref().unwrap_or(&[])
    }

    fn slot(&self, dimension: EntityDimension) -> &Option<Vec<String>> {
        match dimension {
            EntityDimension::Product => &self.products,
            EntityDimension::Insurer => &self.insurers,
            EntityDimension::ClientType => &self.client_types,
            EntityDimension::Region => &self.regions,
            EntityDimension::State => &self.states,
            EntityDimension::City => &self.cities,
            EntityDimension::Team => &self.teams,
        }
    }

    fn slot_mut(&mut self, dimension: EntityDimension) -> &mut Option<Vec<String>> {
        match dimension {
            EntityDimension::Product => &mut self.products,
            EntityDimension::Insurer => &mut self.insurers,
            EntityDimension::ClientType => &mut self.client_types,
            EntityDimension::Region => &mut self.regions,
            EntityDimension::State => &mut self.states,
            EntityDimension::City => &mut self.cities,
            EntityDimension::Team => &mut self.teams,
        }
    }

    fn active_dimensions(&self) -> impl Iterator<Item = EntityDimension> + '_ {
        EntityDimension::ALL
            .into_iter()
            .filter(|d| !self.selected(*d).is_empty())
    }
}

pub const NO_ACTIVE_FILTERS: &str = "No active filters";
pub const ANALYTICS_DEPARTMENT: &str = "Analytics";

/// Keep records whose attribute is among the selected ids for every active
/// dimension. Matching is exact.
pub fn apply_all<T>(records: &[T], state: &FilterState) -> Vec<T>
where
    T: EntityAttributes + Clone,
{
    let active: Vec<EntityDimension> = state.active_dimensions().collect();
    records
        .iter()
        .filter(|r| {
            active.iter().all(|d| {
                r.attribute(*d)
                    .map(|v| state.selected(*d).iter().any(|s| s == v))
                    .unwrap_or(false)
            })
        })
        .cloned()
        .collect()
}

pub fn has_active(state: &FilterState) -> bool {
    state.active_dimensions().next().is_some()
}

pub fn active_count(state: &FilterState) -> usize {
    state.active_dimensions().count()
}

/// `"Products: 2, Regions: 1"`, or [`NO_ACTIVE_FILTERS`].
pub fn summary(state: &FilterState) -> String {
    let parts: Vec<String> = state
        .active_dimensions()
        .map(|d| format!("{}: {}", d.label(), state.selected(d).len()))
        .collect();
    if parts.is_empty() {
        NO_ACTIVE_FILTERS.to_string()
    } else {
        parts.join(", ")
    }
}

/// Make sure the dimensions a report reads are initialised. Existing
/// selections are never dropped; the Analytics department and unknown report
/// keys pass through untouched.
pub fn validate_for_report(state: &FilterState, department: &str, report_type: &str) -> FilterState {
    let mut out = state.clone();
    if department == ANALYTICS_DEPARTMENT {
        return out;
    }
    let required: &[EntityDimension] = match report_type {
        "product" => &[EntityDimension::Product],
        "insurer" => &[EntityDimension::Insurer],
        "vertical" => &[EntityDimension::Product, EntityDimension::Insurer],
        _ => &[],
    };
    for d in required {
        out.slot_mut(*d).get_or_insert_with(Vec::new);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(product: &str, region: &str, team: Option<&str>) -> EntityRecord {
        EntityRecord {
            product: Some(product.into()),
            region: Some(region.into()),
            team: team.map(String::from),
            ..Default::default()
        }
    }

    fn ids(v: &[&str]) -> Option<Vec<String>> {
        Some(v.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn apply_all_is_exact_and_conjunctive() {
        let records = vec![
            rec("p1", "north", Some("t1")),
            rec("p1", "south", Some("t1")),
            rec("P1", "north", Some("t1")),
            rec("p2", "north", None),
        ];
        let state = FilterState {
            products: ids(&["p1", "p2"]),
            regions: ids(&["north"]),
            ..Default::default()
        };
        let kept = apply_all(&records, &state);
        assert_eq!(kept, vec![records[0].clone(), records[3].clone()]);

        let with_team = FilterState {
            teams: ids(&["t1"]),
            ..state
        };
        assert_eq!(apply_all(&records, &with_team), vec![records[0].clone()]);
    }

    #[test]
    fn inactive_state_keeps_everything() {
        let records = vec![rec("p1", "north", None)];
        let state = FilterState {
            products: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(apply_all(&records, &state), records);
        assert!(!has_active(&state));
        assert_eq!(active_count(&state), 0);
        assert_eq!(summary(&state), NO_ACTIVE_FILTERS);
    }

    #[test]
    fn counts_and_summary_follow_dimension_order() {
        let state = FilterState {
            regions: ids(&["north"]),
            products: ids(&["p1", "p2"]),
            cities: ids(&["pune", "goa", "agra"]),
            ..Default::default()
        };
        assert!(has_active(&state));
        assert_eq!(active_count(&state), 3);
        assert_eq!(summary(&state), "Products: 2, Regions: 1, Cities: 3");
    }

    #[test]
    fn validate_initialises_without_dropping_selections() {
        let state = FilterState {
            insurers: ids(&["i1"]),
            ..Default::default()
        };

        let product = validate_for_report(&state, "Sales", "product");
        assert_eq!(product.products, Some(vec![]));
        assert_eq!(product.insurers, ids(&["i1"]));

        let vertical = validate_for_report(&state, "Sales", "vertical");
        assert_eq!(vertical.products, Some(vec![]));
        assert_eq!(vertical.insurers, ids(&["i1"]));

        assert_eq!(validate_for_report(&state, "Analytics", "product"), state);
        assert_eq!(validate_for_report(&state, "Sales", "leaderboard"), state);
    }

    #[test]
    fn undefined_dimensions_are_omitted_from_json() {
        let state = validate_for_report(&FilterState::default(), "Sales", "insurer");
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"insurers":[]}"#);
    }
}
