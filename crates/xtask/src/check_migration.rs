use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

pub(crate) fn run() -> Result<(), String> {
    let migration_dirs = find_migration_dirs(Path::new("crates"));

    for dir in migration_dirs {
        check_prefixes(&dir)?;
        check_foreign_key_names(&dir)?;
        info!("Checked migrations in {}", dir.display());
    }

    Ok(())
}

fn find_migration_dirs(base: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(err) => {
            error!("Failed to read {}: {}", base.display(), err);

            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let migrations_path = entry.path().join("migrations");
        if migrations_path.is_dir() {
            dirs.push(migrations_path);
        }
    }
    dirs.sort();

    dirs
}

fn sql_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries =
        fs::read_dir(dir).map_err(|err| format!("Failed to read {}: {err}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn check_prefixes(dir: &Path) -> Result<(), String> {
    let mut prefix_map: HashMap<String, Vec<String>> = HashMap::new();

    for path in sql_files(dir)? {
        let file_name = file_name(&path);
        if let Some(prefix) = file_name.split('_').next() {
            prefix_map
                .entry(prefix.to_string())
                .or_default()
                .push(file_name.clone());
        }
    }

    for (prefix, files) in &mut prefix_map {
        files.sort();
        if files.len() > 1 {
            return Err(format!(
                "Duplicate migration prefix `{prefix}` in {}: {}",
                dir.display(),
                files.join(", ")
            ));
        }
    }

    Ok(())
}

/// Requires every foreign key to be declared as
/// `CONSTRAINT fk_<table>_<column>_<referenced_table> FOREIGN KEY ...`.
fn check_foreign_key_names(dir: &Path) -> Result<(), String> {
    let mut violations = Vec::new();

    for path in sql_files(dir)? {
        let sql = fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        let file_name = file_name(&path);
        violations.extend(
            foreign_key_violations(&sql)
                .into_iter()
                .map(|violation| format!("{file_name}: {violation}")),
        );
    }

    if violations.is_empty() {
        return Ok(());
    }

    Err(format!(
        "Foreign key naming violations in {}:\n{}",
        dir.display(),
        violations.join("\n")
    ))
}

fn foreign_key_violations(sql: &str) -> Vec<String> {
    let tokens = tokenize(sql);
    let upper: Vec<String> = tokens.iter().map(|token| token.to_ascii_uppercase()).collect();
    let keyword = |index: usize| upper.get(index).map_or("", String::as_str);

    let mut violations = Vec::new();
    let mut table = String::new();
    let mut constraint: Option<String> = None;
    let mut index = 0;

    while index < tokens.len() {
        match keyword(index) {
            "TABLE" if matches!(keyword(index.wrapping_sub(1)), "CREATE" | "TEMP" | "TEMPORARY") => {
                index += 1;
                if keyword(index) == "IF" {
                    index += 3;
                }
                table = tokens.get(index).map(|name| unquote(name)).unwrap_or_default();
            }
            "CONSTRAINT" => {
                index += 1;
                constraint = tokens.get(index).map(|name| unquote(name));
            }
            "FOREIGN" if keyword(index + 1) == "KEY" => {
                index += 2;
                let mut columns = Vec::new();
                if keyword(index) == "(" {
                    index += 1;
                    while index < tokens.len() && keyword(index) != ")" {
                        if keyword(index) != "," {
                            columns.push(unquote(&tokens[index]));
                        }
                        index += 1;
                    }
                    index += 1;
                }
                let referenced = if keyword(index) == "REFERENCES" {
                    tokens.get(index + 1).map(|name| unquote(name)).unwrap_or_default()
                } else {
                    String::new()
                };
                index += 1;

                let column = columns.first().cloned().unwrap_or_default();
                let expected = format!("fk_{table}_{column}_{referenced}");
                match constraint.take() {
                    Some(name) if name == expected => {}
                    Some(name) => violations.push(format!(
                        "foreign key `{name}` on {table}.{column} should be named `{expected}`"
                    )),
                    None => violations.push(format!(
                        "unnamed foreign key on {table}.{column}; name it `{expected}`"
                    )),
                }
            }
            "REFERENCES" => violations.push(format!(
                "inline REFERENCES in table {table}; declare a named \
                 `CONSTRAINT fk_... FOREIGN KEY` instead"
            )),
            "," | ";" => constraint = None,
            _ => {}
        }
        index += 1;
    }

    violations
}

/// Splits SQL into words and punctuation, dropping `--` comments.
fn tokenize(sql: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for line in sql.lines() {
        let code = line.split("--").next().unwrap_or_default();
        let mut current = String::new();
        for ch in code.chars() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | ',' | ';') {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                if !ch.is_whitespace() {
                    tokens.push(ch.to_string());
                }
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }

    tokens
}

fn unquote(identifier: &str) -> String {
    identifier
        .trim_matches(|ch| matches!(ch, '"' | '`' | '[' | ']'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_check_prefixes_no_duplicates() {
        // Arrange
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("001_create_freebies.sql"), "").expect("write");
        fs::write(dir.path().join("002_add_email.sql"), "").expect("write");

        // Act
        let result = check_prefixes(dir.path());

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_check_prefixes_with_duplicates() {
        // Arrange
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("001_create_devs.sql"), "").expect("write");
        fs::write(dir.path().join("001_create_companies.sql"), "").expect("write");

        // Act
        let result = check_prefixes(dir.path());

        // Assert
        let err = result.expect_err("duplicate prefix accepted");
        assert!(err.contains("Duplicate migration prefix `001`"), "{err}");
        assert!(err.contains("001_create_companies.sql"), "{err}");
        assert!(err.contains("001_create_devs.sql"), "{err}");
    }

    #[test]
    fn test_check_prefixes_ignores_non_sql() {
        // Arrange
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("001_create_freebies.sql"), "").expect("write");
        fs::write(dir.path().join("001_readme.md"), "").expect("write");

        // Act
        let result = check_prefixes(dir.path());

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_find_migration_dirs() {
        // Arrange
        let dir = tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("freebies").join("migrations")).expect("mkdir");
        fs::create_dir_all(dir.path().join("xtask").join("src")).expect("mkdir");

        // Act
        let dirs = find_migration_dirs(dir.path());

        // Assert
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("migrations"));
    }

    #[test]
    fn test_named_foreign_keys_pass() {
        // Arrange
        let sql = "CREATE TABLE freebies (
            id INTEGER PRIMARY KEY,
            dev_id INTEGER NOT NULL, -- owner
            company_id INTEGER NOT NULL,
            CONSTRAINT fk_freebies_dev_id_devs
                FOREIGN KEY (dev_id) REFERENCES devs (id) ON DELETE CASCADE,
            CONSTRAINT fk_freebies_company_id_companies
                FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
        );";

        // Act
        let violations = foreign_key_violations(sql);

        // Assert
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_misnamed_foreign_key_is_reported() {
        // Arrange
        let sql = "CREATE TABLE IF NOT EXISTS freebies (
            dev_id INTEGER,
            CONSTRAINT freebie_owner FOREIGN KEY (dev_id) REFERENCES devs (id)
        );";

        // Act
        let violations = foreign_key_violations(sql);

        // Assert
        assert_eq!(
            violations,
            vec![
                "foreign key `freebie_owner` on freebies.dev_id should be named \
                 `fk_freebies_dev_id_devs`"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_unnamed_foreign_keys_are_reported() {
        // Arrange
        let sql = "CREATE TABLE freebies (
            dev_id INTEGER REFERENCES devs (id),
            company_id INTEGER,
            FOREIGN KEY (company_id) REFERENCES companies (id)
        );";

        // Act
        let violations = foreign_key_violations(sql);

        // Assert
        assert_eq!(violations.len(), 2, "{violations:?}");
        assert!(violations[0].starts_with("inline REFERENCES in table freebies"));
        assert_eq!(
            violations[1],
            "unnamed foreign key on freebies.company_id; name it \
             `fk_freebies_company_id_companies`"
        );
    }

    #[test]
    fn test_check_foreign_key_names_reports_file() {
        // Arrange
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(
            dir.path().join("001_create_freebies.sql"),
            "CREATE TABLE freebies (dev_id INTEGER, FOREIGN KEY (dev_id) REFERENCES devs (id));",
        )
        .expect("write");

        // Act
        let result = check_foreign_key_names(dir.path());

        // Assert
        let err = result.expect_err("unnamed foreign key accepted");
        assert!(err.contains("001_create_freebies.sql: unnamed foreign key"), "{err}");
    }
}
