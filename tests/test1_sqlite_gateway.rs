#![cfg(feature = "sqlite")]

use sql_gateway::{Gateway, QueryGateway, ResultSet, RowValues, SqlGatewayError};
use tempfile::TempDir;
use tokio::runtime::Runtime;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS stores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at DATETIME NOT NULL DEFAULT (datetime('now')),
        updated_at DATETIME NOT NULL DEFAULT (datetime('now'))
    );
    CREATE TABLE IF NOT EXISTS weekly_menus (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        store_id TEXT NOT NULL,
        day_of_week INTEGER NOT NULL,
        menu_name TEXT NOT NULL,
        price REAL,
        week_start_date TEXT NOT NULL,
        updated_at DATETIME NOT NULL DEFAULT (datetime('now')),
        UNIQUE (store_id, day_of_week, week_start_date)
    );
";

fn setup(rt: &Runtime) -> Result<(TempDir, Gateway), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("gateway_test.db");
    let gateway = rt.block_on(async {
        let gateway = Gateway::connect_sqlite(db_path.to_str().unwrap()).await?;
        gateway.execute_batch(SCHEMA).await?;
        Ok::<_, SqlGatewayError>(gateway)
    })?;
    Ok((dir, gateway))
}

async fn seed_weekly_menus(gateway: &Gateway) -> Result<(), SqlGatewayError> {
    for (day, name, price) in [
        (1, "Curry", 850.0),
        (2, "Ramen", 900.0),
        (3, "Soba", 750.0),
    ] {
        gateway
            .execute(
                "INSERT INTO weekly_menus (store_id, day_of_week, menu_name, price, week_start_date)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    RowValues::Text("s1".into()),
                    RowValues::Int(day),
                    RowValues::Text(name.into()),
                    RowValues::Float(price),
                    RowValues::Text("2025-06-02".into()),
                ],
            )
            .await?;
    }
    Ok(())
}

// The end-to-end scenario: a fresh insert with ON CONFLICT DO NOTHING and
// RETURNING * yields the stored row; the identical second call yields
// nothing.
#[test]
fn insert_returning_and_conflict_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        let sql = "INSERT INTO stores (store_id, name, password_hash)
                   VALUES ($1, $2, $3)
                   ON CONFLICT (store_id) DO NOTHING
                   RETURNING *";
        let params = vec![
            RowValues::Text("s1".into()),
            RowValues::Text("Store One".into()),
            RowValues::Text("hash".into()),
        ];

        let first = gateway.execute(sql, &params).await?;
        assert_eq!(first.rows.len(), 1);
        assert_eq!(first.rows_affected, 1);
        let row = &first.rows[0];
        assert_eq!(row.get("store_id").unwrap().as_text(), Some("s1"));
        assert_eq!(row.get("name").unwrap().as_text(), Some("Store One"));
        // Generated and defaulted columns are populated on the way back.
        assert!(row.get("id").unwrap().as_int().is_some());
        assert!(row.get("created_at").unwrap().as_timestamp().is_some());

        let second = gateway.execute(sql, &params).await?;
        assert!(second.rows.is_empty());
        assert_eq!(second.rows_affected, 0);

        // The conflicting attempt left exactly one row for the key.
        let count = gateway
            .execute(
                "SELECT * FROM stores WHERE store_id = $1",
                &[RowValues::Text("s1".into())],
            )
            .await?;
        assert_eq!(count.rows.len(), 1);

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn select_returns_all_matching_rows_and_is_idempotent()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        seed_weekly_menus(&gateway).await?;

        let sql = "SELECT * FROM weekly_menus WHERE store_id = $1 ORDER BY day_of_week ASC";
        let params = vec![RowValues::Text("s1".into())];

        let first = gateway.execute(sql, &params).await?;
        assert_eq!(first.rows.len(), 3);
        assert_eq!(first.rows_affected, 3);
        assert_eq!(first.rows[0].get("menu_name").unwrap().as_text(), Some("Curry"));

        // Idempotent absent intervening writes.
        let second = gateway.execute(sql, &params).await?;
        assert_eq!(second.rows.len(), first.rows.len());
        for (a, b) in first.rows.iter().zip(second.rows.iter()) {
            assert_eq!(a.values, b.values);
        }

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn with_query_is_treated_as_a_read() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        seed_weekly_menus(&gateway).await?;

        let rs = gateway
            .execute(
                "WITH priced AS (SELECT * FROM weekly_menus WHERE price >= $1)
                 SELECT menu_name FROM priced ORDER BY day_of_week",
                &[RowValues::Float(800.0)],
            )
            .await?;
        assert_eq!(rs.rows.len(), 2);
        assert_eq!(rs.rows_affected, 2);

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

// The documented capability gap: UPDATE ... RETURNING * on SQLite returns no
// rows, only the affected count.
#[test]
fn update_returning_reports_count_without_rows() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        seed_weekly_menus(&gateway).await?;

        let rs = gateway
            .execute(
                "UPDATE weekly_menus SET price = $1, updated_at = NOW()
                 WHERE store_id = $2 AND day_of_week <= $3
                 RETURNING *",
                &[
                    RowValues::Float(500.0),
                    RowValues::Text("s1".into()),
                    RowValues::Int(2),
                ],
            )
            .await?;
        assert!(rs.rows.is_empty());
        assert_eq!(rs.rows_affected, 2);

        // The NOW() rewrite produced a parseable timestamp.
        let check = gateway
            .execute(
                "SELECT updated_at FROM weekly_menus WHERE day_of_week = $1",
                &[RowValues::Int(1)],
            )
            .await?;
        assert!(check.rows[0].get("updated_at").unwrap().as_timestamp().is_some());

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn repeated_placeholder_binds_in_call_order() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        seed_weekly_menus(&gateway).await?;

        // $1 appears twice; [s1, 2] must bind as [s1, 2, s1].
        let rs = gateway
            .execute(
                "SELECT * FROM weekly_menus
                 WHERE store_id = $1 AND (day_of_week = $2 OR menu_name = $1)",
                &[RowValues::Text("s1".into()), RowValues::Int(2)],
            )
            .await?;
        assert_eq!(rs.rows.len(), 1);
        assert_eq!(rs.rows[0].get("menu_name").unwrap().as_text(), Some("Ramen"));

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn date_rewrite_matches_stored_dates() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        seed_weekly_menus(&gateway).await?;

        let rs = gateway
            .execute(
                "SELECT * FROM weekly_menus WHERE DATE(week_start_date) = DATE($1)",
                &[RowValues::Text("2025-06-02".into())],
            )
            .await?;
        assert_eq!(rs.rows.len(), 3);

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn plain_writes_report_affected_rows() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        seed_weekly_menus(&gateway).await?;

        let rs = gateway
            .execute(
                "DELETE FROM weekly_menus WHERE store_id = $1 AND day_of_week > $2",
                &[RowValues::Text("s1".into()), RowValues::Int(1)],
            )
            .await?;
        assert!(rs.rows.is_empty());
        assert_eq!(rs.rows_affected, 2);

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn translation_errors_name_the_template() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        let err = gateway.execute(" ", &[]).await.unwrap_err();
        assert!(matches!(err, SqlGatewayError::TranslationError { .. }));

        let err = gateway
            .execute(
                "SELECT * FROM stores WHERE store_id = $2",
                &[RowValues::Text("s1".into())],
            )
            .await
            .unwrap_err();
        match err {
            SqlGatewayError::TranslationError { sql, .. } => {
                assert!(sql.contains("$2"));
            }
            other => panic!("expected translation error, got {other:?}"),
        }

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

// A gateway that is never closed still tears down cleanly, provided the drop
// happens inside the runtime (pooled connections need one to shut down).
#[test]
fn dropping_an_unclosed_gateway_inside_the_runtime_is_clean()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let dir = TempDir::new()?;
    let db_path = dir.path().join("drop_test.db");

    rt.block_on(async {
        let gateway = Gateway::connect_sqlite(db_path.to_str().unwrap()).await?;
        gateway.execute_batch(SCHEMA).await?;
        gateway
            .execute("SELECT * FROM stores", &[])
            .await?;
        drop(gateway);
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

// Foreign keys are enforced on every pooled connection, not just the one
// checked out at pool creation.
#[test]
fn foreign_keys_are_enforced_on_pooled_connections()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    let (_dir, gateway) = setup(&rt)?;

    rt.block_on(async {
        gateway
            .execute_batch(
                "
                CREATE TABLE parents (id INTEGER PRIMARY KEY);
                CREATE TABLE children (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    parent_id INTEGER NOT NULL REFERENCES parents (id)
                );
            ",
            )
            .await?;

        let err = gateway
            .execute(
                "INSERT INTO children (parent_id) VALUES ($1)",
                &[RowValues::Int(42)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SqlGatewayError::ExecutionError { .. }));

        gateway.close();
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

// The QueryGateway trait is the seam for call sites; a canned double stands
// in for the real backend.
struct CannedGateway;

#[async_trait::async_trait]
impl QueryGateway for CannedGateway {
    async fn execute(
        &self,
        _sql: &str,
        _params: &[RowValues],
    ) -> Result<ResultSet, SqlGatewayError> {
        let mut rs = ResultSet::with_capacity(1);
        rs.set_column_names(std::sync::Arc::new(vec!["store_id".into()]));
        rs.add_row_values(vec![RowValues::Text("stub".into())]);
        Ok(rs)
    }

    async fn execute_batch(&self, _script: &str) -> Result<(), SqlGatewayError> {
        Ok(())
    }
}

#[test]
fn call_sites_can_run_against_a_double() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let gateway: &dyn QueryGateway = &CannedGateway;
        let rs = gateway.execute("SELECT * FROM stores", &[]).await?;
        assert_eq!(rs.rows[0].get("store_id").unwrap().as_text(), Some("stub"));
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}
