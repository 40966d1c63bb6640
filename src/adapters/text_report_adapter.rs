//! Plain-text and CSV report adapter.
//!
//! Writes `results.txt` with per-year lines in reverse chronological order,
//! plus one `{year}_perf.csv` per year listing the executed trades.

use crate::domain::backtest::MultiYearRun;
use crate::domain::error::BandtraderError;
use crate::domain::signal;
use crate::domain::strategy::StrategyParameters;
use crate::domain::trade::Trade;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::PathBuf;

pub struct TextReportAdapter {
    output_dir: PathBuf,
}

impl TextReportAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

fn csv_err(e: csv::Error) -> BandtraderError {
    BandtraderError::Io(std::io::Error::other(e))
}

impl ReportPort for TextReportAdapter {
    fn write_summary(
        &self,
        params: &StrategyParameters,
        run: &MultiYearRun,
    ) -> Result<(), BandtraderError> {
        fs::create_dir_all(&self.output_dir)?;

        let start = run.years.first().map(|y| y.year).unwrap_or_default();
        let end = run.years.last().map(|y| y.year).unwrap_or_default();

        let mut lines = Vec::new();
        lines.push(signal::describe(params));
        lines.push(format!(
            "Parameters: count={} pct={:.2} window={}",
            params.count, params.pct, params.window
        ));
        lines.push(String::new());
        lines.push(format!("Multi-Year Backtest Results ({start}-{end})"));
        lines.push("=".repeat(50));
        for year in run.years.iter().rev() {
            lines.push(format!(
                "Finished processing year {}. Compounded gain: {:.2}%",
                year.year, year.result.compounded_return
            ));
        }
        lines.push(String::new());
        lines.push(format!(
            "Final Compounded Return ({start}-{end}): {:.3}x",
            run.compound_factor
        ));
        lines.push(String::new());

        fs::write(self.output_dir.join("results.txt"), lines.join("\n"))?;
        Ok(())
    }

    fn write_year_trades(&self, year: i32, trades: &[Trade]) -> Result<(), BandtraderError> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(format!("{year}_perf.csv"));
        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;

        wtr.write_record([
            "ticker",
            "entry_date",
            "entry_price",
            "exit_date",
            "exit_price",
            "return_pct",
            "below_band",
            "days_held",
        ])
        .map_err(csv_err)?;

        for trade in trades {
            wtr.write_record([
                trade.ticker.clone(),
                trade.entry_date.to_string(),
                format!("{}", trade.entry_price),
                trade.exit_date.to_string(),
                format!("{}", trade.exit_price),
                format!("{:.4}", trade.return_pct()),
                format!("{:.4}", trade.below_band),
                trade.days_held.to_string(),
            ])
            .map_err(csv_err)?;
        }

        wtr.flush().map_err(BandtraderError::Io)?;
        Ok(())
    }
}
