//! Read-only lookups used by reports and the command line.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

use crate::store::models::{
    BattingLine, FieldingLine, Game, InningScore, PitchingLine, PlayEvent, Player, RowId, Team,
};

fn collect<T, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn team(conn: &Connection, id: RowId) -> Result<Option<Team>> {
    conn.query_row(
        &format!("SELECT {} FROM teams WHERE id = ?1", Team::COLUMNS),
        params![id],
        Team::from_row,
    )
    .optional()
    .with_context(|| format!("Failed to read team #{id}"))
}

pub fn team_by_code(conn: &Connection, code: &str, season_id: RowId) -> Result<Option<Team>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM teams WHERE code = ?1 AND season_id = ?2",
            Team::COLUMNS
        ),
        params![code, season_id],
        Team::from_row,
    )
    .optional()
    .with_context(|| format!("Failed to read team {code}"))
}

pub fn teams_in_season(conn: &Connection, season_id: RowId) -> Result<Vec<Team>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM teams WHERE season_id = ?1 ORDER BY name, code",
            Team::COLUMNS
        ),
        params![season_id],
        Team::from_row,
    )
    .context("Failed to list teams")
}

pub fn player(conn: &Connection, id: RowId) -> Result<Option<Player>> {
    conn.query_row(
        &format!("SELECT {} FROM players WHERE id = ?1", Player::COLUMNS),
        params![id],
        Player::from_row,
    )
    .optional()
    .with_context(|| format!("Failed to read player #{id}"))
}

pub fn players_on_team(conn: &Connection, team_id: RowId) -> Result<Vec<Player>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM players WHERE team_id = ?1 ORDER BY name, uniform_number",
            Player::COLUMNS
        ),
        params![team_id],
        Player::from_row,
    )
    .context("Failed to list players")
}

pub fn game(conn: &Connection, id: RowId) -> Result<Option<Game>> {
    conn.query_row(
        &format!("SELECT {} FROM games WHERE id = ?1", Game::COLUMNS),
        params![id],
        Game::from_row,
    )
    .optional()
    .with_context(|| format!("Failed to read game #{id}"))
}

pub fn games_for_team(conn: &Connection, team_id: RowId) -> Result<Vec<Game>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM games WHERE visitor_team_id = ?1 OR home_team_id = ?1
             ORDER BY date, start_time, doubleheader, id",
            Game::COLUMNS
        ),
        params![team_id],
        Game::from_row,
    )
    .context("Failed to list team games")
}

pub fn games_in_season(conn: &Connection, season_id: RowId) -> Result<Vec<Game>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM games
             WHERE home_team_id IN (SELECT id FROM teams WHERE season_id = ?1)
             ORDER BY date, start_time, doubleheader, id",
            Game::COLUMNS
        ),
        params![season_id],
        Game::from_row,
    )
    .context("Failed to list season games")
}

pub fn inning_scores(conn: &Connection, game_id: RowId) -> Result<Vec<InningScore>> {
    collect(
        conn,
        "SELECT game_id, inning, visitor_score, home_score FROM inning_scores
         WHERE game_id = ?1 ORDER BY inning",
        params![game_id],
        InningScore::from_row,
    )
    .context("Failed to read inning scores")
}

/// Plays in the order they happened: by inning, top before bottom, then sequence.
pub fn plays(conn: &Connection, game_id: RowId) -> Result<Vec<PlayEvent>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM plays WHERE game_id = ?1
             ORDER BY inning, CASE half WHEN 'top' THEN 0 ELSE 1 END, sequence, id",
            PlayEvent::COLUMNS
        ),
        params![game_id],
        PlayEvent::from_row,
    )
    .context("Failed to read plays")
}

pub fn batting_for_player(conn: &Connection, player_id: RowId) -> Result<Vec<BattingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM batting_stats WHERE player_id = ?1 ORDER BY game_id",
            BattingLine::COLUMNS
        ),
        params![player_id],
        BattingLine::from_row,
    )
    .context("Failed to read batting lines")
}

pub fn pitching_for_player(conn: &Connection, player_id: RowId) -> Result<Vec<PitchingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM pitching_stats WHERE player_id = ?1 ORDER BY game_id",
            PitchingLine::COLUMNS
        ),
        params![player_id],
        PitchingLine::from_row,
    )
    .context("Failed to read pitching lines")
}

pub fn fielding_for_player(conn: &Connection, player_id: RowId) -> Result<Vec<FieldingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM fielding_stats WHERE player_id = ?1 ORDER BY game_id",
            FieldingLine::COLUMNS
        ),
        params![player_id],
        FieldingLine::from_row,
    )
    .context("Failed to read fielding lines")
}

/// Every batting line recorded for a team, across all of its games.
pub fn batting_for_team(conn: &Connection, team_id: RowId) -> Result<Vec<BattingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM batting_stats WHERE team_id = ?1 ORDER BY player_id, game_id",
            BattingLine::COLUMNS
        ),
        params![team_id],
        BattingLine::from_row,
    )
    .context("Failed to read team batting lines")
}

pub fn pitching_for_team(conn: &Connection, team_id: RowId) -> Result<Vec<PitchingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM pitching_stats WHERE team_id = ?1 ORDER BY player_id, game_id",
            PitchingLine::COLUMNS
        ),
        params![team_id],
        PitchingLine::from_row,
    )
    .context("Failed to read team pitching lines")
}

/// A team's batting order for one game.
pub fn batting_in_game(conn: &Connection, game_id: RowId, team_id: RowId) -> Result<Vec<BattingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM batting_stats WHERE game_id = ?1 AND team_id = ?2
             ORDER BY batting_order, is_sub, id",
            BattingLine::COLUMNS
        ),
        params![game_id, team_id],
        BattingLine::from_row,
    )
    .context("Failed to read game batting lines")
}

pub fn pitching_in_game(conn: &Connection, game_id: RowId, team_id: RowId) -> Result<Vec<PitchingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM pitching_stats WHERE game_id = ?1 AND team_id = ?2 ORDER BY id",
            PitchingLine::COLUMNS
        ),
        params![game_id, team_id],
        PitchingLine::from_row,
    )
    .context("Failed to read game pitching lines")
}

pub fn fielding_in_game(conn: &Connection, game_id: RowId, team_id: RowId) -> Result<Vec<FieldingLine>> {
    collect(
        conn,
        &format!(
            "SELECT {} FROM fielding_stats WHERE game_id = ?1 AND team_id = ?2 ORDER BY id",
            FieldingLine::COLUMNS
        ),
        params![game_id, team_id],
        FieldingLine::from_row,
    )
    .context("Failed to read game fielding lines")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_file::traits::InningHalf;
    use crate::game_file::{GameFile, ParseOptions};
    use crate::season::Ruleset;
    use crate::store::games::store_game;
    use crate::store::Store;

    const GAME: &str = r#"<bsgame>
  <venue date="2025-05-01" start="6:00 PM"/>
  <team vh="V" code="AAA" name="Visitors">
    <linescore runs="0"><lineinn inn="1" score="0"/><lineinn inn="2" score="0"/></linescore>
    <player name="Late, Sub" uni="30" gp="1" spot="2" sub="1"><hitting ab="1"/></player>
    <player name="Lead, Off" uni="3" gp="1" gs="1" spot="1"><hitting ab="2" h="1"/></player>
    <player name="Two, Hole" uni="5" gp="1" gs="1" spot="2"><hitting ab="2"/></player>
  </team>
  <team vh="H" code="BBB" name="Homers">
    <linescore runs="1"><lineinn inn="1" score="1"/><lineinn inn="2" score="X"/></linescore>
  </team>
  <plays>
    <inning number="2">
      <batting vh="V"><play seq="1"><narrative text="second inning top"/></play></batting>
    </inning>
    <inning number="1">
      <batting vh="H"><play seq="1"><narrative text="first inning bottom"/></play></batting>
      <batting vh="V">
        <play seq="2"><narrative text="first inning top, later"/></play>
        <play seq="1"><narrative text="first inning top"/></play>
      </batting>
    </inning>
  </plays>
</bsgame>"#;

    fn stored() -> (Store, Game) {
        let mut store = Store::open_in_memory().unwrap();
        let season = store.create_season("S", Ruleset::HighSchoolSoftball).unwrap();
        let file = GameFile::parse(GAME.as_bytes(), &ParseOptions::default()).unwrap();
        let game = store_game(store.conn_mut(), &file, season.id)
            .unwrap()
            .game()
            .clone();
        (store, game)
    }

    #[test]
    fn plays_come_back_in_game_order() {
        let (store, game) = stored();
        let narratives = plays(store.conn(), game.id)
            .unwrap()
            .into_iter()
            .map(|p| (p.inning, p.half, p.narrative))
            .collect::<Vec<_>>();
        assert_eq!(
            narratives,
            vec![
                (1, InningHalf::Top, String::from("first inning top")),
                (1, InningHalf::Top, String::from("first inning top, later")),
                (1, InningHalf::Bottom, String::from("first inning bottom")),
                (2, InningHalf::Top, String::from("second inning top")),
            ]
        );
    }

    #[test]
    fn batting_order_puts_starters_before_subs() {
        let (store, game) = stored();
        let lines = batting_in_game(store.conn(), game.id, game.key.visitor_team_id).unwrap();
        let names = lines
            .iter()
            .map(|l| player(store.conn(), l.owner.player_id).unwrap().unwrap().name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Lead, Off", "Two, Hole", "Late, Sub"]);
    }

    #[test]
    fn inning_scores_keep_markers() {
        let (store, game) = stored();
        let innings = inning_scores(store.conn(), game.id).unwrap();
        assert_eq!(innings.len(), 2);
        assert_eq!(innings[1].home_score, "X");
    }

    #[test]
    fn teams_and_games_by_season() {
        let (store, game) = stored();
        let home = team(store.conn(), game.key.home_team_id).unwrap().unwrap();
        let teams = teams_in_season(store.conn(), home.season_id).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(team_by_code(store.conn(), "BBB", home.season_id).unwrap(), Some(home.clone()));
        assert_eq!(games_for_team(store.conn(), home.id).unwrap(), vec![game.clone()]);
        assert_eq!(games_in_season(store.conn(), home.season_id).unwrap().len(), 1);
        assert_eq!(players_on_team(store.conn(), game.key.visitor_team_id).unwrap().len(), 3);
    }
}
