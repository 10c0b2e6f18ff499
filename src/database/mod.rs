use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use std::sync::Arc;
use tracing::info;

pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성
    /// 풀의 모든 연결에 잠금 대기 / 쿼리 제한 시간을 설정한다.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let lock_timeout_ms = config.lock_timeout.as_millis();
        let statement_timeout_ms = config.statement_timeout.as_millis();

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    let lock_sql = format!("SET lock_timeout = '{}ms'", lock_timeout_ms);
                    conn.execute(lock_sql.as_str()).await?;
                    let statement_sql =
                        format!("SET statement_timeout = '{}ms'", statement_timeout_ms);
                    conn.execute(statement_sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&config.url)
            .await?;

        info!(
            "{:<12} --> 데이터베이스 연결 풀 생성 (max_connections={})",
            "Database", config.max_connections
        );

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 스키마 생성 (매 시작 시 호출해도 안전)
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        let create_schema_sql = include_str!("../../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }
}
