use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::db::models::{AnalyzedFightRow, ParlayLegRow, ParlayRow};
use crate::error::Result;
use crate::types::{
    AnalyzedFight, BettingAdvice, Corner, FightPrediction, Fighter, Parlay, StoredParlay,
};

const ANALYZED_FIGHT_COLUMNS: &str = r#"
    id, fighter1_name, fighter2_name, fighter1_odds, fighter2_odds,
    fighter1_probability, fighter2_probability, finish_probability,
    goes_to_distance, likely_method, confidence, recommended_bet,
    fighter1_kelly, fighter1_ev, fighter2_kelly, fighter2_ev,
    analysis, created_at
"#;

/// Everything needed to persist one analysis.
pub struct NewAnalysis<'a> {
    pub fighter1: &'a Fighter,
    pub fighter2: &'a Fighter,
    pub prediction: &'a FightPrediction,
    pub advice: &'a BettingAdvice,
    pub analysis: &'a str,
}

/// SQLite-backed store for fighters, analyzed fights, and parlays.
///
/// Multi-statement writes run inside one transaction. An early return drops
/// the transaction, which rolls it back.
#[derive(Clone)]
pub struct FightStore {
    pool: SqlitePool,
}

impl FightStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert or update fighters by name, all or nothing.
    pub async fn upsert_fighters(&self, fighters: &[&Fighter]) -> Result<()> {
        let now = now_rfc3339();
        let mut tx = self.pool.begin().await?;
        for fighter in fighters {
            upsert_fighter(&mut tx, fighter, &now).await?;
        }
        tx.commit().await?;
        debug!(count = fighters.len(), "Upserted fighters");
        Ok(())
    }

    /// Upsert both fighters and insert the analysis in a single transaction.
    pub async fn save_analysis(&self, new: &NewAnalysis<'_>) -> Result<AnalyzedFight> {
        let created_at = now_rfc3339();
        let p = new.prediction;
        let a = new.advice;
        let goes_to_distance = p.goes_to_distance.to_string();
        let likely_method = p.likely_method.map(|m| m.to_string());

        let mut tx = self.pool.begin().await?;
        upsert_fighter(&mut tx, new.fighter1, &created_at).await?;
        upsert_fighter(&mut tx, new.fighter2, &created_at).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO analyzed_fights (
                fighter1_name, fighter2_name, fighter1_odds, fighter2_odds,
                fighter1_probability, fighter2_probability, finish_probability,
                goes_to_distance, likely_method, confidence, recommended_bet,
                fighter1_kelly, fighter1_ev, fighter2_kelly, fighter2_ev,
                analysis, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.fighter1.name)
        .bind(&new.fighter2.name)
        .bind(new.fighter1.american_odds)
        .bind(new.fighter2.american_odds)
        .bind(p.win_probability.fighter1)
        .bind(p.win_probability.fighter2)
        .bind(p.finish_probability)
        .bind(&goes_to_distance)
        .bind(&likely_method)
        .bind(p.confidence)
        .bind(&p.recommended_bet)
        .bind(a.fighter1.map(|s| s.kelly_bet))
        .bind(a.fighter1.map(|s| s.expected_value))
        .bind(a.fighter2.map(|s| s.kelly_bet))
        .bind(a.fighter2.map(|s| s.expected_value))
        .bind(new.analysis)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;
        info!(
            analyzed_fight_id = id,
            fighter1 = %new.fighter1.name,
            fighter2 = %new.fighter2.name,
            "Saved analysis"
        );

        Ok(AnalyzedFight {
            id,
            fighter1: Corner {
                name: new.fighter1.name.clone(),
                odds: new.fighter1.american_odds,
            },
            fighter2: Corner {
                name: new.fighter2.name.clone(),
                odds: new.fighter2.american_odds,
            },
            prediction: p.clone(),
            betting_advice: *a,
            analysis: new.analysis.to_string(),
            created_at,
        })
    }

    /// Newest first.
    pub async fn list_analyzed_fights(&self, limit: i64) -> Result<Vec<AnalyzedFight>> {
        let sql = format!(
            "SELECT {ANALYZED_FIGHT_COLUMNS} FROM analyzed_fights ORDER BY id DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, AnalyzedFightRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AnalyzedFight::from).collect())
    }

    /// Most confident analyses first; fights without a confidence go last.
    pub async fn parlay_candidates(&self, limit: i64) -> Result<Vec<AnalyzedFight>> {
        let sql = format!(
            "SELECT {ANALYZED_FIGHT_COLUMNS} FROM analyzed_fights \
             ORDER BY confidence IS NULL, confidence DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, AnalyzedFightRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AnalyzedFight::from).collect())
    }

    /// Persist a parlay and its legs. Parlays are never updated afterwards.
    pub async fn save_parlay(&self, parlay: &Parlay) -> Result<StoredParlay> {
        let created_at = now_rfc3339();
        let risk_level = parlay.risk_level.to_string();

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
            INSERT INTO parlays (
                size, total_confidence, total_decimal_odds, total_american_odds,
                expected_value, risk_level, recommended_stake, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(parlay.size as i64)
        .bind(parlay.total_confidence)
        .bind(parlay.total_decimal_odds)
        .bind(parlay.total_american_odds)
        .bind(parlay.expected_value)
        .bind(&risk_level)
        .bind(parlay.recommended_stake)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (position, leg) in parlay.legs.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO parlay_legs (
                    parlay_id, position, analyzed_fight_id, fighters, pick,
                    recommended_bet, confidence, method, odds, decimal_odds
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(id)
            .bind(position as i64)
            .bind(leg.analyzed_fight_id)
            .bind(&leg.fighters)
            .bind(&leg.pick)
            .bind(&leg.recommended_bet)
            .bind(leg.confidence)
            .bind(&leg.method)
            .bind(leg.odds)
            .bind(leg.decimal_odds)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(parlay_id = id, size = parlay.size, risk = %parlay.risk_level, "Saved parlay");

        Ok(StoredParlay {
            id,
            created_at,
            parlay: parlay.clone(),
        })
    }

    pub async fn list_parlays(&self, limit: i64) -> Result<Vec<StoredParlay>> {
        let rows = sqlx::query_as::<_, ParlayRow>(
            r#"
            SELECT id, size, total_confidence, total_decimal_odds, total_american_odds,
                   expected_value, risk_level, recommended_stake, created_at
            FROM parlays
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut parlays = Vec::with_capacity(rows.len());
        for row in rows {
            let legs = sqlx::query_as::<_, ParlayLegRow>(
                r#"
                SELECT analyzed_fight_id, fighters, pick, recommended_bet,
                       confidence, method, odds, decimal_odds
                FROM parlay_legs
                WHERE parlay_id = ?
                ORDER BY position
                "#,
            )
            .bind(row.id)
            .fetch_all(&self.pool)
            .await?;
            parlays.push(row.into_stored(legs.into_iter().map(Into::into).collect()));
        }
        Ok(parlays)
    }
}

async fn upsert_fighter(conn: &mut SqliteConnection, f: &Fighter, now: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO fighters (
            name, age, height, reach, wins, losses, ko_wins, sub_wins, decision_wins,
            strike_accuracy, takedown_accuracy, takedown_defense, american_odds, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            age = excluded.age,
            height = excluded.height,
            reach = excluded.reach,
            wins = excluded.wins,
            losses = excluded.losses,
            ko_wins = excluded.ko_wins,
            sub_wins = excluded.sub_wins,
            decision_wins = excluded.decision_wins,
            strike_accuracy = excluded.strike_accuracy,
            takedown_accuracy = excluded.takedown_accuracy,
            takedown_defense = excluded.takedown_defense,
            american_odds = excluded.american_odds,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&f.name)
    .bind(f.age)
    .bind(f.height)
    .bind(f.reach)
    .bind(f.wins as i64)
    .bind(f.losses as i64)
    .bind(f.ko_wins as i64)
    .bind(f.sub_wins as i64)
    .bind(f.decision_wins as i64)
    .bind(f.strike_accuracy)
    .bind(f.takedown_accuracy)
    .bind(f.takedown_defense)
    .bind(f.american_odds)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Single-connection in-memory store with migrations applied.
#[cfg(test)]
pub async fn test_store() -> FightStore {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = FightStore::new(pool);
    store.migrate().await.unwrap();
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{betting_advice, build_parlay, predict};
    use crate::types::{FinishMethod, ParlayCandidate};

    fn fighter(name: &str, wins: u32, losses: u32, ko: u32, odds: Option<i64>) -> Fighter {
        Fighter {
            wins,
            losses,
            ko_wins: ko,
            american_odds: odds,
            ..Fighter::named(name)
        }
    }

    async fn save(store: &FightStore, f1: &Fighter, f2: &Fighter) -> AnalyzedFight {
        let prediction = predict(f1, f2);
        let advice = betting_advice(f1, f2, &prediction).unwrap();
        store
            .save_analysis(&NewAnalysis {
                fighter1: f1,
                fighter2: f2,
                prediction: &prediction,
                advice: &advice,
                analysis: "narrative",
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_updates_by_name() {
        let store = test_store().await;
        store
            .upsert_fighters(&[&fighter("Jones", 26, 1, 10, None)])
            .await
            .unwrap();
        store
            .upsert_fighters(&[&fighter("Jones", 27, 1, 11, Some(-300))])
            .await
            .unwrap();

        let (count, wins, odds): (i64, i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), MAX(wins), MAX(american_odds) FROM fighters WHERE name = 'Jones'",
        )
        .fetch_one(&store.pool)
        .await
        .unwrap();
        assert_eq!((count, wins, odds), (1, 27, Some(-300)));
    }

    #[tokio::test]
    async fn saved_analysis_reads_back() {
        let store = test_store().await;
        let f1 = fighter("Aspinall", 14, 3, 12, Some(-250));
        let f2 = fighter("Gane", 12, 2, 6, Some(200));
        let saved = save(&store, &f1, &f2).await;

        let listed = store.list_analyzed_fights(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], saved);
        assert_eq!(listed[0].prediction.likely_method, Some(FinishMethod::KoTko));
        assert!(listed[0].betting_advice.fighter1.is_some());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let store = test_store().await;
        for i in 0..3 {
            let f1 = fighter(&format!("A{i}"), 5, 1, 1, None);
            let f2 = fighter(&format!("B{i}"), 5, 1, 1, None);
            save(&store, &f1, &f2).await;
        }
        let listed = store.list_analyzed_fights(2).await.unwrap();
        let names: Vec<_> = listed.iter().map(|f| f.fighter1.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "A1"]);
    }

    #[tokio::test]
    async fn parlay_round_trip() {
        let store = test_store().await;
        save(&store, &fighter("K1", 10, 0, 9, Some(-150)), &fighter("K2", 10, 0, 8, Some(130))).await;
        save(&store, &fighter("D1", 10, 2, 1, Some(110)), &fighter("D2", 9, 3, 1, Some(-120))).await;
        save(&store, &fighter("S1", 10, 0, 7, Some(-200)), &fighter("S2", 10, 1, 7, Some(170))).await;

        let candidates: Vec<ParlayCandidate> = store
            .parlay_candidates(10)
            .await
            .unwrap()
            .iter()
            .map(ParlayCandidate::from)
            .collect();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[2].confidence, None);

        let parlay = build_parlay(candidates, 2).unwrap();
        let stored = store.save_parlay(&parlay).await.unwrap();

        let listed = store.list_parlays(5).await.unwrap();
        assert_eq!(listed, vec![stored]);
        assert_eq!(listed[0].parlay.legs.len(), 2);
        assert_eq!(listed[0].parlay.legs[0].fighters, "K1 vs K2");
    }

    async fn reject_inserts(store: &FightStore, table: &str) {
        let sql = format!(
            "CREATE TRIGGER reject_{table} BEFORE INSERT ON {table} \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END"
        );
        sqlx::query(&sql).execute(&store.pool).await.unwrap();
    }

    async fn count(store: &FightStore, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&store.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn failed_analysis_insert_rolls_back_fighters() {
        let store = test_store().await;
        reject_inserts(&store, "analyzed_fights").await;

        let f1 = fighter("Pereira", 9, 2, 7, Some(-150));
        let f2 = fighter("Hill", 12, 1, 7, Some(130));
        let prediction = predict(&f1, &f2);
        let advice = betting_advice(&f1, &f2, &prediction).unwrap();
        let result = store
            .save_analysis(&NewAnalysis {
                fighter1: &f1,
                fighter2: &f2,
                prediction: &prediction,
                advice: &advice,
                analysis: "",
            })
            .await;

        assert!(result.is_err());
        assert_eq!(count(&store, "fighters").await, 0);
        assert_eq!(count(&store, "analyzed_fights").await, 0);
    }

    #[tokio::test]
    async fn failed_upsert_keeps_no_partial_batch() {
        let store = test_store().await;
        sqlx::query(
            "CREATE TRIGGER reject_named BEFORE INSERT ON fighters WHEN NEW.name = 'Rejected' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let ok = fighter("Makhachev", 26, 1, 5, None);
        let bad = fighter("Rejected", 1, 0, 0, None);
        assert!(store.upsert_fighters(&[&ok, &bad]).await.is_err());
        assert_eq!(count(&store, "fighters").await, 0);
    }

    #[tokio::test]
    async fn failed_leg_insert_rolls_back_parlay() {
        let store = test_store().await;
        save(&store, &fighter("K1", 10, 0, 9, Some(-150)), &fighter("K2", 10, 0, 8, Some(130))).await;
        save(&store, &fighter("S1", 10, 0, 7, Some(-200)), &fighter("S2", 10, 1, 7, Some(170))).await;
        let candidates: Vec<ParlayCandidate> = store
            .parlay_candidates(10)
            .await
            .unwrap()
            .iter()
            .map(ParlayCandidate::from)
            .collect();
        let parlay = build_parlay(candidates, 2).unwrap();

        reject_inserts(&store, "parlay_legs").await;
        assert!(store.save_parlay(&parlay).await.is_err());
        assert_eq!(count(&store, "parlays").await, 0);
        assert!(store.list_parlays(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ping_succeeds() {
        test_store().await.ping().await.unwrap();
    }
}
