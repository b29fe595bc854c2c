use rusqlite::{Connection, Row, named_params};

use crate::page::{PAGE_SIZE, Paginated};
use crate::store::StoreError;

/// One listing row: the employee flattened with its department name.
/// The photo blob itself stays in the store; the listing only needs to know
/// whether one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRow {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub department_name: String,
    pub phone_number: Option<String>,
    pub has_photo: bool,
}

// `instr` compares bytes, so the search is case-sensitive.
const SEARCH_FILTER: &str = "instr(e.last_name || ' ' || e.first_name || ' ' || e.patronymic,
                                   :term) > 0
                             OR instr(coalesce(e.phone_number, ''), :term) > 0";

fn read_row(row: &Row) -> rusqlite::Result<EmployeeRow> {
    Ok(EmployeeRow {
        id: row.get(0)?,
        last_name: row.get(1)?,
        first_name: row.get(2)?,
        patronymic: row.get(3)?,
        department_name: row.get(4)?,
        phone_number: row.get(5)?,
        has_photo: row.get(6)?,
    })
}

/// Filtered, windowed view over employees joined with their department.
///
/// When `search` is non-empty, a row is kept if the space-joined
/// `last_name first_name patronymic` concatenation or the phone number
/// contains it as a substring. Rows are ordered by `id` ascending so the
/// windows stay deterministic; `page_number` starts at 1 and a page past the
/// end is an empty window.
pub fn list(
    conn: &Connection,
    search: Option<&str>,
    page_number: u32,
) -> Result<Paginated<EmployeeRow>, StoreError> {
    let term = search.filter(|s| !s.is_empty());
    let offset = page_number.saturating_sub(1).saturating_mul(PAGE_SIZE);

    let select = format!(
        "SELECT e.id, e.last_name, e.first_name, e.patronymic, d.name,
                e.phone_number, e.profile_photo IS NOT NULL
         FROM employee e
         JOIN department d ON d.id = e.department_id
         {where_clause}
         ORDER BY e.id
         LIMIT :limit OFFSET :offset",
        where_clause = match term {
            Some(_) => format!("WHERE {}", SEARCH_FILTER),
            None => String::new(),
        }
    );
    let count = format!(
        "SELECT count(*) FROM employee e {where_clause}",
        where_clause = match term {
            Some(_) => format!("WHERE {}", SEARCH_FILTER),
            None => String::new(),
        }
    );

    let (total_count, items) = match term {
        Some(term) => {
            let total_count: u32 =
                conn.query_row(&count, named_params! { ":term": term }, |row| row.get(0))?;
            let mut stmt = conn.prepare(&select)?;
            let rows = stmt.query_map(
                named_params! { ":term": term, ":limit": PAGE_SIZE, ":offset": offset },
                read_row,
            )?;
            (total_count, rows.collect::<Result<Vec<_>, _>>()?)
        }
        None => {
            let total_count: u32 = conn.query_row(&count, [], |row| row.get(0))?;
            let mut stmt = conn.prepare(&select)?;
            let rows = stmt.query_map(
                named_params! { ":limit": PAGE_SIZE, ":offset": offset },
                read_row,
            )?;
            (total_count, rows.collect::<Result<Vec<_>, _>>()?)
        }
    };

    Ok(Paginated::new(items, total_count, page_number, PAGE_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EmployeeForm;
    use crate::store::EmployeeStore;

    fn seeded_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON").unwrap();
        let store = EmployeeStore::new(&conn);
        store.create_tables().unwrap();

        let engineering = store.insert_department("Engineering").unwrap();
        let accounting = store.insert_department("Accounting").unwrap();

        for i in 1..=12 {
            let form = EmployeeForm {
                last_name: format!("Last{:02}", i),
                first_name: format!("First{:02}", i),
                patronymic: if i % 2 == 0 {
                    String::new()
                } else {
                    format!("Mid{:02}", i)
                },
                department_id: if i <= 6 { engineering } else { accounting },
                phone_number: if i == 3 {
                    Some("+7 901 555-33-44".to_string())
                } else {
                    None
                },
            };
            store.insert_employee(&form, None).unwrap();
        }

        conn
    }

    #[test]
    fn unfiltered_first_page_is_ids_one_to_five() {
        let conn = seeded_db();
        let page = list(&conn, None, 1).unwrap();

        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(!page.has_previous_page());
        assert!(page.has_next_page());
    }

    #[test]
    fn unfiltered_third_page_is_the_remainder() {
        let conn = seeded_db();
        let page = list(&conn, None, 3).unwrap();

        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![11, 12]);
        assert!(!page.has_next_page());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = seeded_db();
        let page = list(&conn, None, 4).unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn rows_carry_the_department_name() {
        let conn = seeded_db();
        let page = list(&conn, None, 1).unwrap();

        assert_eq!(page.items[0].department_name, "Engineering");
        let last = list(&conn, None, 3).unwrap();
        assert_eq!(last.items[0].department_name, "Accounting");
    }

    #[test]
    fn search_matches_name_substring() {
        let conn = seeded_db();
        let page = list(&conn, Some("Last07"), 1).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 7);
    }

    #[test]
    fn search_spans_the_joined_full_name() {
        // the space between last and first name is part of the haystack
        let conn = seeded_db();
        let page = list(&conn, Some("Last04 First04"), 1).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 4);
    }

    #[test]
    fn search_matches_phone_substring() {
        let conn = seeded_db();
        let page = list(&conn, Some("555-33"), 1).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, 3);
    }

    #[test]
    fn search_is_case_sensitive() {
        let conn = seeded_db();
        let page = list(&conn, Some("last07"), 1).unwrap();

        assert!(page.items.is_empty());
    }

    #[test]
    fn empty_search_term_means_no_filter() {
        let conn = seeded_db();
        let page = list(&conn, Some(""), 1).unwrap();

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn search_results_are_paginated_too() {
        // "First" hits all twelve rows
        let conn = seeded_db();
        let page = list(&conn, Some("First"), 2).unwrap();

        let ids: Vec<i64> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![6, 7, 8, 9, 10]);
        assert!(page.has_previous_page());
        assert!(page.has_next_page());
    }
}
