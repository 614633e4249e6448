//! Plain-text rendering of a [`FacilityDirectory`]. Formatting only: totals and
//! address choices are taken as given.

use crate::domain::model::{
    CoverageIndicators, DisplayAddress, DisplayFacility, FacilityDirectory, Municipality,
    PopulationProfile,
};
use std::fmt::Write;

const RULE: &str = "----------------------------------------------------------------------";
const BANNER: &str = "======================================================================";

fn header(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", BANNER);
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", BANNER);
}

pub fn render_municipalities(uf: &str, municipalities: &[Municipality]) -> String {
    let mut out = String::new();
    header(&mut out, &format!("MUNICIPALITIES OF {}", uf));
    let _ = writeln!(out, "Total: {}", municipalities.len());
    let _ = writeln!(out);
    for (index, municipality) in municipalities.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:3}. {} (IBGE {})",
            index + 1,
            municipality.name,
            municipality.id
        );
    }
    out
}

pub fn render_directory(directory: &FacilityDirectory) -> String {
    let mut out = String::new();
    header(
        &mut out,
        &format!(
            "HEALTH FACILITIES: {} - {}",
            directory.municipality.name, directory.municipality.uf
        ),
    );

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  Facilities:           {:>12}", directory.totals.facility_count);
    let _ = writeln!(out, "    UBS:                {:>12}", directory.totals.ubs_count);
    let _ = writeln!(out, "    Other:              {:>12}", directory.totals.other_count);
    let _ = writeln!(out, "  Doctors:              {:>12}", directory.totals.doctors);
    let _ = writeln!(out, "  Nurses:               {:>12}", directory.totals.nurses);
    let _ = writeln!(out, "{}", RULE);

    if directory.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "No facilities found for this municipality.");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "FACILITIES");
    let _ = writeln!(out, "{}", RULE);
    for (index, facility) in directory.facilities.iter().enumerate() {
        render_facility(&mut out, index + 1, facility);
    }
    out
}

fn render_facility(out: &mut String, position: usize, entry: &DisplayFacility) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}. {}", position, entry.facility.name);
    let _ = writeln!(out, "   CNES: {}", entry.facility.cnes);

    match &entry.address {
        DisplayAddress::Resolved(address) => {
            let _ = writeln!(out, "   Address: {}", address.street);
            if let Some(neighborhood) = &address.neighborhood {
                let _ = writeln!(out, "   Neighborhood: {}", neighborhood);
            }
            let _ = writeln!(out, "   Postal code: {}", address.postal_code);
            let _ = writeln!(out, "   City: {} - {}", address.locality, address.region);
        }
        DisplayAddress::Stored {
            address,
            postal_code,
        } => {
            let _ = writeln!(out, "   Address: {}", address);
            let _ = writeln!(out, "   Postal code: {}", postal_code);
        }
    }

    let _ = writeln!(
        out,
        "   Coordinates: Lat {}, Long {}",
        entry.facility.latitude, entry.facility.longitude
    );
    let _ = writeln!(out, "   {}", &RULE[..66]);
}

pub fn render_population(profile: &PopulationProfile) -> String {
    let mut out = String::new();
    header(&mut out, &format!("POPULATION: {}", profile.municipality_name));
    let rows = [
        ("Total", profile.total),
        ("Men", profile.men),
        ("Women", profile.women),
        ("0 to 10 years", profile.age_0_10),
        ("11 to 20 years", profile.age_11_20),
        ("21 to 30 years", profile.age_21_30),
        ("40 years or more", profile.age_40_plus),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<20}{:>12}", format!("{}:", label), value);
    }
    out
}

/// Directory totals against the population, as ratios per inhabitants.
pub fn render_coverage(directory: &FacilityDirectory, profile: &PopulationProfile) -> String {
    let coverage = CoverageIndicators::compute(&directory.totals, profile);
    let mut out = String::new();
    header(
        &mut out,
        &format!("COVERAGE: {} - {}", directory.municipality.name, directory.municipality.uf),
    );
    if profile.total == 0 {
        let _ = writeln!(out, "  No population data; indicators shown as 0.");
    }
    let _ = writeln!(out, "  Facilities per 10,000 inhabitants: {:>10.2}", coverage.facilities_per_10k);
    let _ = writeln!(out, "  Doctors per 1,000 inhabitants:     {:>10.2}", coverage.doctors_per_1k);
    let _ = writeln!(out, "  Nurses per 1,000 inhabitants:      {:>10.2}", coverage.nurses_per_1k);
    out
}
