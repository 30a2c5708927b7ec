use crate::error::ScrapeError;
use crate::models::{BetType, OddsLine};
use crate::utils::retry::{retry, RetryConfig};
use crate::utils::time::normalize_event_time;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

const VERIBET_ODDS_URL: &str = "https://veri.bet/x-ajax-oddspicks?sDate={date}&showAll=yes";
const SOCCER_LEAGUE: &str = "SOCCER";
const NOT_AVAILABLE: &str = "N/A";

/// CSS selectors for the odds board, compiled once.
struct Selectors {
    odds_table: Selector,
    league_header: Selector,
    game_div: Selector,
    game_table: Selector,
    muted_span: Selector,
    time_badge: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            odds_table: Selector::parse("table#odds-picks").unwrap(),
            league_header: Selector::parse("h2").unwrap(),
            game_div: Selector::parse("div.col.col-md").unwrap(),
            game_table: Selector::parse("table").unwrap(),
            muted_span: Selector::parse("span.text-muted").unwrap(),
            time_badge: Selector::parse("span.badge.badge-light.text-wrap.text-left").unwrap(),
        }
    }
}

/// Shared metadata for one game, read once and stamped onto every line.
struct GameInfo {
    period: String,
    team1: String,
    team2: String,
    event_time: String,
}

impl GameInfo {
    fn matchup(&self, league: &str) -> String {
        format!("{}: {} vs {}", league, self.team1, self.team2)
    }
}

/// The rows accumulated under one league section header.
struct LeagueRows<'a> {
    league: String,
    rows: Vec<ElementRef<'a>>,
}

/// Scraper for the veri.bet odds board.
///
/// Fetches the date-parameterized listing and extracts every posted
/// moneyline, spread and totals line (plus the draw line for soccer)
/// into [`OddsLine`] records, in document order.
pub struct VeriBetScraper {
    client: reqwest::Client,
    retry_config: RetryConfig,
    selectors: Selectors,
}

impl VeriBetScraper {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .build()
                .unwrap(),
            retry_config: RetryConfig::default(),
            selectors: Selectors::new(),
        }
    }

    /// Fetch the board for `date` (MM-DD-YYYY) and extract all betting lines.
    pub async fn fetch_odds(&self, date: &str) -> Result<Vec<OddsLine>> {
        let url = VERIBET_ODDS_URL.replace("{date}", date);
        debug!("fetching odds board from {}", url);

        let html = retry(&self.retry_config, "odds board fetch", || {
            let client = self.client.clone();
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .context("Failed to fetch odds board")?;
                if !response.status().is_success() {
                    anyhow::bail!("odds board returned status {}", response.status());
                }
                response
                    .text()
                    .await
                    .context("Failed to read odds board body")
            }
        })
        .await?;

        let today = Local::now().date_naive();
        self.parse_document(&html, today).map_err(Into::into)
    }

    /// Extract every betting line from one board document.
    ///
    /// A missing board table (upstream error pages) yields an empty list so
    /// the polling loop can simply try again next cycle; a data row before
    /// the first league header is a hard fault for the cycle.
    pub fn parse_document(
        &self,
        html: &str,
        today: NaiveDate,
    ) -> Result<Vec<OddsLine>, ScrapeError> {
        let document = Html::parse_document(html);

        let Some(board) = document.select(&self.selectors.odds_table).next() else {
            warn!("odds board table not found in the response");
            return Ok(Vec::new());
        };

        let rows = direct_child_rows(board);
        debug!("found {} first-level rows", rows.len());

        let groups = self.group_rows_by_league(&rows)?;
        debug!("grouped rows into {} leagues", groups.len());

        let mut lines = Vec::new();
        for group in &groups {
            debug!("processing {} rows for {}", group.rows.len(), group.league);
            for row in &group.rows {
                for game_div in row.select(&self.selectors.game_div) {
                    lines.extend(self.extract_game(game_div, &group.league, today));
                }
            }
        }

        info!("extracted {} betting lines", lines.len());
        Ok(lines)
    }

    /// Partition the board's first-level rows into per-league groups.
    ///
    /// A repeated header for the same league keeps the group's position but
    /// clears its accumulated rows, matching the upstream board's behavior
    /// of re-publishing a section wholesale.
    fn group_rows_by_league<'a>(
        &self,
        rows: &[ElementRef<'a>],
    ) -> Result<Vec<LeagueRows<'a>>, ScrapeError> {
        let mut groups: Vec<LeagueRows<'a>> = Vec::new();
        let mut current: Option<usize> = None;

        for row in rows {
            if let Some(header) = row.select(&self.selectors.league_header).next() {
                let league = header.text().collect::<String>().trim().to_string();
                let index = match groups.iter().position(|g| g.league == league) {
                    Some(i) => {
                        groups[i].rows.clear();
                        i
                    }
                    None => {
                        groups.push(LeagueRows {
                            league,
                            rows: Vec::new(),
                        });
                        groups.len() - 1
                    }
                };
                current = Some(index);
                continue;
            }

            let Some(index) = current else {
                return Err(ScrapeError::Structural(
                    "data row encountered before the first league header".to_string(),
                ));
            };
            groups[index].rows.push(*row);
        }

        Ok(groups)
    }

    /// Extract one game's lines, skipping the whole game on any malformed
    /// cell so a single bad fragment never blanks out a league or cycle.
    fn extract_game(
        &self,
        game_div: ElementRef<'_>,
        league: &str,
        today: NaiveDate,
    ) -> Vec<OddsLine> {
        match self.extract_game_lines(game_div, league, today) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("skipping malformed game in {}: {}", league, e);
                Vec::new()
            }
        }
    }

    fn extract_game_lines(
        &self,
        game_div: ElementRef<'_>,
        league: &str,
        today: NaiveDate,
    ) -> Result<Vec<OddsLine>, ScrapeError> {
        let table = game_div
            .select(&self.selectors.game_table)
            .next()
            .ok_or_else(|| ScrapeError::extraction("game table", league))?;

        let rows = direct_child_rows(table);
        if rows.len() < 4 {
            return Err(ScrapeError::extraction(
                format!("game rows (found {}, need 4)", rows.len()),
                league,
            ));
        }

        let info = self.extract_game_info(&rows, league, today)?;
        debug!(
            "processing game: {} vs {} at {}",
            info.team1, info.team2, info.event_time
        );

        let mut lines = Vec::new();
        for row in &rows[1..3] {
            let cells = direct_child_cells(*row);
            lines.push(self.moneyline_line(&cells, &info, league)?);
            lines.push(self.spread_line(&cells, &info, league)?);
            lines.push(self.totals_line(&cells, &info, league)?);
        }

        if league == SOCCER_LEAGUE {
            let cells = direct_child_cells(rows[3]);
            lines.push(self.draw_line(&cells, &info, league)?);
        }

        Ok(lines)
    }

    /// Read the shared metadata rows: [0] period, [1]/[2] teams, [3] time.
    fn extract_game_info(
        &self,
        rows: &[ElementRef<'_>],
        league: &str,
        today: NaiveDate,
    ) -> Result<GameInfo, ScrapeError> {
        let period = clean_text(&self.muted_text(rows[0], "period label", league)?);
        let team1 = self
            .muted_text(rows[1], "team 1 label", league)?
            .trim()
            .to_string();
        let team2 = self
            .muted_text(rows[2], "team 2 label", league)?
            .trim()
            .to_string();

        let context = format!("{}: {} vs {}", league, team1, team2);
        let raw_time = rows[3]
            .select(&self.selectors.time_badge)
            .next()
            .map(|span| span.text().collect::<String>())
            .ok_or_else(|| ScrapeError::extraction("time badge", &context))?;
        let event_time = normalize_event_time(clean_text(raw_time.trim()).as_str(), today)?;

        Ok(GameInfo {
            period,
            team1,
            team2,
            event_time,
        })
    }

    /// Moneyline: cell 0 names the team, cell 1 carries the price.
    fn moneyline_line(
        &self,
        cells: &[ElementRef<'_>],
        info: &GameInfo,
        league: &str,
    ) -> Result<OddsLine, ScrapeError> {
        let context = info.matchup(league);
        let team = self
            .muted_text(cell(cells, 0, &context)?, "moneyline team label", &context)?
            .trim()
            .to_string();
        let price = self
            .muted_text(cell(cells, 1, &context)?, "moneyline price", &context)?
            .trim()
            .to_string();

        Ok(self.assemble(
            info,
            league,
            BetType::Moneyline,
            price,
            team.clone(),
            team,
            "0".to_string(),
        ))
    }

    /// Spread: cell 2 reads "<line>(<price>)", or "N/A" when withdrawn.
    fn spread_line(
        &self,
        cells: &[ElementRef<'_>],
        info: &GameInfo,
        league: &str,
    ) -> Result<OddsLine, ScrapeError> {
        let context = info.matchup(league);
        let team = self
            .muted_text(cell(cells, 0, &context)?, "spread team label", &context)?
            .trim()
            .to_string();
        let text = self
            .muted_text(cell(cells, 2, &context)?, "spread text", &context)?
            .trim()
            .to_string();

        let (line_value, price) = if text == NOT_AVAILABLE {
            (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
        } else {
            split_priced_line(&text)
                .ok_or_else(|| ScrapeError::extraction("spread line/price pair", &context))?
        };

        Ok(self.assemble(
            info,
            league,
            BetType::Spread,
            price,
            team.clone(),
            team,
            line_value,
        ))
    }

    /// Totals: cell 3 reads "<O|U> <line>(<price>)", or "N/A" when withdrawn.
    fn totals_line(
        &self,
        cells: &[ElementRef<'_>],
        info: &GameInfo,
        league: &str,
    ) -> Result<OddsLine, ScrapeError> {
        let context = info.matchup(league);
        let raw = self.muted_text(cell(cells, 3, &context)?, "totals text", &context)?;
        let text = normalize_inline_whitespace(raw.trim());

        let (line_value, price) = if text == NOT_AVAILABLE {
            (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())
        } else {
            let head = text
                .split_once('(')
                .map(|(head, _)| head)
                .ok_or_else(|| ScrapeError::extraction("totals price", &context))?;
            let line_value = head
                .split_whitespace()
                .nth(1)
                .ok_or_else(|| ScrapeError::extraction("totals line value", &context))?
                .to_string();
            let (_, price) = split_priced_line(&text)
                .ok_or_else(|| ScrapeError::extraction("totals price", &context))?;
            (line_value, price)
        };

        // The original maps any leading token other than "O" to "under",
        // including the withdrawn "N/A" case.
        let side = if text.split_whitespace().next() == Some("O") {
            "over"
        } else {
            "under"
        };

        Ok(self.assemble(
            info,
            league,
            BetType::Totals,
            price,
            side.to_string(),
            "total".to_string(),
            line_value,
        ))
    }

    /// Soccer draw: the time row's cell 1 reads "<label> <price>".
    fn draw_line(
        &self,
        cells: &[ElementRef<'_>],
        info: &GameInfo,
        league: &str,
    ) -> Result<OddsLine, ScrapeError> {
        let context = info.matchup(league);
        let raw = self.muted_text(cell(cells, 1, &context)?, "draw text", &context)?;
        let text = normalize_inline_whitespace(raw.trim());
        let price = text
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| ScrapeError::extraction("draw price", &context))?
            .to_string();

        Ok(self.assemble(
            info,
            league,
            BetType::Moneyline,
            price,
            "draw".to_string(),
            "draw".to_string(),
            "0".to_string(),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        info: &GameInfo,
        league: &str,
        bet_type: BetType,
        price: String,
        side: String,
        subject: String,
        line_value: String,
    ) -> OddsLine {
        OddsLine {
            league: league.to_string(),
            event_time: info.event_time.clone(),
            team1: info.team1.clone(),
            team2: info.team2.clone(),
            pitcher: String::new(),
            period: info.period.clone(),
            bet_type,
            price,
            side,
            subject,
            line_value,
        }
    }

    /// Text of the first muted span under `el`, the board's label idiom.
    fn muted_text(
        &self,
        el: ElementRef<'_>,
        what: &str,
        context: &str,
    ) -> Result<String, ScrapeError> {
        el.select(&self.selectors.muted_span)
            .next()
            .map(|span| span.text().collect::<String>())
            .ok_or_else(|| ScrapeError::extraction(what, context))
    }
}

impl Default for VeriBetScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Direct `<tr>` children of a table, looking through the implicit
/// `<tbody>` that html5ever inserts around bare rows.
fn direct_child_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Direct `<td>` children of a row, in left-to-right order.
fn direct_child_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect()
}

fn cell<'a>(
    cells: &[ElementRef<'a>],
    index: usize,
    context: &str,
) -> Result<ElementRef<'a>, ScrapeError> {
    cells
        .get(index)
        .copied()
        .ok_or_else(|| ScrapeError::extraction(format!("cell {}", index), context))
}

/// Split "<line>(<price>)" at the first parenthesis pair.
fn split_priced_line(text: &str) -> Option<(String, String)> {
    let (line, rest) = text.split_once('(')?;
    let (price, _) = rest.split_once(')')?;
    Some((line.trim().to_string(), price.trim().to_string()))
}

/// Strip embedded line breaks and tabs from a label.
fn clean_text(text: &str) -> String {
    text.trim()
        .replace('\r', "")
        .replace('\n', "")
        .replace('\t', "")
}

/// The board wraps totals/draw text across lines; fold the break into a
/// single space and drop tabs before tokenizing.
fn normalize_inline_whitespace(text: &str) -> String {
    text.replace("\r\n", " ").replace('\t', "")
}
