//! Sample data for local development.

use tracing::info;

use crate::app::session::Session;
use crate::domain::NewFreebie;
use crate::error::AppError;
use crate::infra::db::FreebieStore;

/// Record counts written by [`seed`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SeedSummary {
    pub companies: usize,
    pub devs: usize,
    pub freebies: usize,
}

/// Replaces the store contents with the sample companies, devs and freebies
/// and commits them in one go.
///
/// Running it twice leaves the same three freebies behind.
///
/// # Errors
/// Returns an error if staging a freebie fails or the commit is rejected.
pub fn seed<S: FreebieStore>(session: &mut Session<S>) -> Result<SeedSummary, AppError> {
    let summary = session.modify(|graph| {
        graph.clear();

        let tech_corp = graph.add_company("TechCorp", 2000)?;
        let innovate = graph.add_company("Innovate Inc.", 1995)?;

        let alice = graph.add_dev("Alice")?;
        let bob = graph.add_dev("Bob")?;

        graph.add_freebie(NewFreebie::new("T-Shirt", 10, alice, tech_corp))?;
        graph.add_freebie(NewFreebie::new("Mug", 5, bob, tech_corp))?;
        graph.add_freebie(NewFreebie::new("Sticker", 2, alice, innovate))?;

        Ok(SeedSummary {
            companies: graph.companies().count(),
            devs: graph.devs().count(),
            freebies: graph.freebies().count(),
        })
    })?;
    session.commit()?;
    info!(
        companies = summary.companies,
        devs = summary.devs,
        freebies = summary.freebies,
        "seeded database"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn freebie_rows(db: &Database) -> Vec<(String, i64, String, String)> {
        let graph = db.load().expect("failed to load");

        graph
            .freebies()
            .map(|freebie| {
                let dev = graph.dev(freebie.dev()).expect("missing dev");
                let company = graph.company(freebie.company()).expect("missing company");

                (
                    freebie.item_name.clone(),
                    freebie.value,
                    dev.name.clone(),
                    company.name.clone(),
                )
            })
            .collect()
    }

    fn expected_rows() -> Vec<(String, i64, String, String)> {
        [
            ("T-Shirt", 10, "Alice", "TechCorp"),
            ("Mug", 5, "Bob", "TechCorp"),
            ("Sticker", 2, "Alice", "Innovate Inc."),
        ]
        .into_iter()
        .map(|(item_name, value, dev, company)| {
            (
                item_name.to_string(),
                value,
                dev.to_string(),
                company.to_string(),
            )
        })
        .collect()
    }

    #[test]
    fn test_seed_writes_sample_freebies() {
        // Arrange
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("freebies.db");
        let mut session =
            Session::open(Database::open(&db_path).expect("failed to open db"))
                .expect("failed to open session");

        // Act
        let summary = seed(&mut session).expect("failed to seed");
        drop(session);

        // Assert
        assert_eq!(
            summary,
            SeedSummary {
                companies: 2,
                devs: 2,
                freebies: 3,
            }
        );
        let db = Database::open(&db_path).expect("failed to reopen db");
        assert_eq!(freebie_rows(&db), expected_rows());
    }

    #[test]
    fn test_seed_twice_keeps_three_freebies() {
        // Arrange
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("freebies.db");
        let mut session =
            Session::open(Database::open(&db_path).expect("failed to open db"))
                .expect("failed to open session");
        seed(&mut session).expect("failed to seed");

        // Act
        seed(&mut session).expect("failed to reseed");
        drop(session);

        // Assert
        let db = Database::open(&db_path).expect("failed to reopen db");
        assert_eq!(freebie_rows(&db), expected_rows());
    }

    #[test]
    fn test_seeded_oldest_company_is_innovate() {
        // Arrange
        let mut session = Session::open(Database::open_in_memory().expect("failed to open db"))
            .expect("failed to open session");

        // Act
        seed(&mut session).expect("failed to seed");

        // Assert
        let oldest = session.graph().oldest_company().expect("no companies");
        assert_eq!(oldest.name, "Innovate Inc.");
        assert_eq!(oldest.founding_year, 1995);
    }
}
