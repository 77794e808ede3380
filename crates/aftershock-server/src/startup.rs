//! Startup wiring: grid, session log, engine, and coordinator.
//!
//! The obstacle grid is fully built before the coordinator exists, so
//! the pathfinder never sees a partially seeded grid. An invalid grid is
//! the only fatal startup error; an unreachable database falls back to
//! the in-memory session log.

use std::sync::Arc;

use aftershock_core::config::{GridConfig, InfrastructureConfig, TrainerConfig};
use aftershock_core::{DisasterEngine, SharedDisaster};
use aftershock_db::{
    DbError, DecisionRow, MemorySessionLog, PgSessionLog, PostgresPool, SessionLog, SessionRow,
};
use aftershock_types::{DisasterType, SessionId};
use aftershock_world::{ObstacleGrid, Pathfinder, WorldError, seed_default_buildings, seed_points};
use tracing::{info, warn};

use crate::coordinator::Coordinator;

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The obstacle grid could not be built.
    #[error("grid error: {0}")]
    Grid(#[from] WorldError),
}

/// Session log chosen at startup.
#[derive(Debug)]
pub enum AnySessionLog {
    /// `PostgreSQL`-backed history.
    Postgres(PgSessionLog),
    /// Process-local history.
    Memory(MemorySessionLog),
}

impl AnySessionLog {
    /// Whether history survives a restart.
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Postgres(_))
    }

    /// Release database connections. A no-op for the in-memory log.
    pub async fn close(&self) {
        if let Self::Postgres(log) = self {
            log.close().await;
        }
    }
}

impl SessionLog for AnySessionLog {
    async fn log_session_start(&self, disaster: DisasterType) -> Result<SessionId, DbError> {
        match self {
            Self::Postgres(log) => log.log_session_start(disaster).await,
            Self::Memory(log) => log.log_session_start(disaster).await,
        }
    }

    async fn log_session_end(
        &self,
        session: SessionId,
        duration_secs: f64,
        score: i64,
    ) -> Result<(), DbError> {
        match self {
            Self::Postgres(log) => log.log_session_end(session, duration_secs, score).await,
            Self::Memory(log) => log.log_session_end(session, duration_secs, score).await,
        }
    }

    async fn log_decision(
        &self,
        session: SessionId,
        action: &str,
        feedback: &str,
        score_impact: i32,
    ) -> Result<(), DbError> {
        match self {
            Self::Postgres(log) => {
                log.log_decision(session, action, feedback, score_impact)
                    .await
            }
            Self::Memory(log) => {
                log.log_decision(session, action, feedback, score_impact)
                    .await
            }
        }
    }

    async fn recent_sessions(&self, limit: i64) -> Result<Vec<SessionRow>, DbError> {
        match self {
            Self::Postgres(log) => log.recent_sessions(limit).await,
            Self::Memory(log) => log.recent_sessions(limit).await,
        }
    }

    async fn session_decisions(&self, session: SessionId) -> Result<Vec<DecisionRow>, DbError> {
        match self {
            Self::Postgres(log) => log.session_decisions(session).await,
            Self::Memory(log) => log.session_decisions(session).await,
        }
    }
}

/// Build the obstacle grid described by `config` and wrap it in a
/// pathfinder.
///
/// # Errors
///
/// Returns [`WorldError`] for a non-positive extent or an obstacle that
/// falls outside the grid.
pub fn build_pathfinder(config: &GridConfig) -> Result<Pathfinder, WorldError> {
    let mut grid = ObstacleGrid::new(config.half_extent)?;
    if config.default_layout {
        seed_default_buildings(&mut grid)?;
    }
    let extra: Vec<(f64, f64)> = config.obstacles.iter().map(|p| (p.x, p.y)).collect();
    seed_points(&mut grid, &extra)?;
    info!(
        half_extent = grid.half_extent(),
        obstacles = grid.obstacle_count(),
        "obstacle grid ready"
    );
    Ok(Pathfinder::new(grid))
}

/// Connect to `PostgreSQL` and run migrations, or fall back to memory.
pub async fn connect_session_log(config: &InfrastructureConfig) -> AnySessionLog {
    if !config.persistence_enabled {
        info!("persistence disabled, using in-memory session log");
        return AnySessionLog::Memory(MemorySessionLog::new());
    }
    match PostgresPool::connect_and_migrate(&config.postgres_url).await {
        Ok(pool) => {
            info!("session log connected to PostgreSQL");
            AnySessionLog::Postgres(PgSessionLog::new(pool))
        }
        Err(e) => {
            warn!(error = %e, "PostgreSQL unavailable, using in-memory session log");
            AnySessionLog::Memory(MemorySessionLog::new())
        }
    }
}

/// Assemble a coordinator from `config` around an already chosen log.
///
/// # Errors
///
/// Returns [`StartupError::Grid`] if the obstacle grid is invalid.
pub fn build_coordinator<L: SessionLog>(
    config: &TrainerConfig,
    session_log: L,
) -> Result<Arc<Coordinator<L>>, StartupError> {
    let pathfinder = build_pathfinder(&config.grid)?;
    let engine = SharedDisaster::new(DisasterEngine::new(config.simulation.seed));
    Ok(Arc::new(Coordinator::new(
        engine,
        pathfinder,
        session_log,
        config.simulation.default_disaster,
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aftershock_core::config::ObstaclePoint;
    use aftershock_types::GridCoordinate;

    use super::*;

    #[test]
    fn default_grid_has_the_building_lattice() {
        let pathfinder = build_pathfinder(&GridConfig::default()).unwrap();
        assert_eq!(pathfinder.grid().obstacle_count(), 25);
        assert!(pathfinder.grid().is_blocked(GridCoordinate::new(-4, 2)));
    }

    #[test]
    fn extra_obstacles_are_rounded_onto_the_grid() {
        let config = GridConfig {
            default_layout: false,
            obstacles: vec![ObstaclePoint { x: 2.5, y: 7.6 }],
            ..GridConfig::default()
        };
        let pathfinder = build_pathfinder(&config).unwrap();
        assert!(pathfinder.grid().is_blocked(GridCoordinate::new(2, 8)));
        assert_eq!(pathfinder.grid().obstacle_count(), 1);
    }

    #[test]
    fn obstacle_outside_grid_is_fatal() {
        let config = GridConfig {
            half_extent: 3,
            default_layout: false,
            obstacles: vec![ObstaclePoint { x: 10.0, y: 0.0 }],
        };
        assert!(build_pathfinder(&config).is_err());
    }

    #[tokio::test]
    async fn disabled_persistence_uses_memory() {
        let config = InfrastructureConfig {
            persistence_enabled: false,
            ..InfrastructureConfig::default()
        };
        let log = connect_session_log(&config).await;
        assert!(!log.is_durable());
        log.close().await;
        assert!(log.recent_sessions(5).await.unwrap().is_empty());
    }
}
