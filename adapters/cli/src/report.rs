use std::fmt::Write as _;

use tilewalk_core::{AgentKind, AgentSnapshot, AgentView};
use tilewalk_simulation::Outcome;

/// Renders one line per agent followed by the outcome.
pub(crate) fn render(view: &AgentView, outcome: Outcome, ticks: u64) -> String {
    let mut report = String::new();
    for agent in view.iter() {
        let _ = writeln!(report, "{}", agent_line(agent));
    }
    let outcome = match outcome {
        Outcome::Ongoing => "ongoing",
        Outcome::PlayerDefeated => "player defeated",
        Outcome::AutonomousDefeated => "autonomous defeated",
    };
    let _ = writeln!(report, "outcome after {ticks} ticks: {outcome}");
    report
}

fn agent_line(agent: &AgentSnapshot) -> String {
    let kind = match agent.kind {
        AgentKind::Player => "player",
        AgentKind::Autonomous => "autonomous",
    };
    let liveness = if agent.alive { "alive" } else { "dead" };
    format!(
        "{} {kind} {liveness} tile=({}, {}) offset=({}, {}) bounds=({}, {}, {}, {})",
        agent.name,
        agent.cell.column(),
        agent.cell.row(),
        agent.offset.dx,
        agent.offset.dy,
        agent.bounds.x,
        agent.bounds.y,
        agent.bounds.width,
        agent.bounds.height,
    )
}

#[cfg(test)]
mod tests {
    use tilewalk_core::{
        AgentId, CatalogId, CellCoord, PixelOffset, PixelRect, TileValue,
    };

    use super::*;

    #[test]
    fn report_lists_agents_then_outcome() {
        let view = AgentView::from_snapshots(vec![AgentSnapshot {
            id: AgentId::new(0),
            name: "hero".to_owned(),
            kind: AgentKind::Player,
            catalog: CatalogId::new(1),
            speed: 2,
            cell: CellCoord::new(3, 2),
            offset: PixelOffset::new(-4, 1),
            bounds: PixelRect::new(44, 33, 16, 16),
            tile_value: TileValue::new(5),
            health: 0,
            alive: false,
        }]);

        assert_eq!(
            render(&view, Outcome::PlayerDefeated, 42),
            "hero player dead tile=(3, 2) offset=(-4, 1) bounds=(44, 33, 16, 16)\n\
             outcome after 42 ticks: player defeated\n"
        );
    }
}
