//! Plain-text run summary

use rust_decimal::Decimal;
use std::fmt::Write;
use ticketsla_core::{RenderError, Report, ReportRenderer};

/// Console summary of the headline statistics
#[derive(Clone, Debug, Default)]
pub struct SummaryRenderer {
    /// Also list the per-division table
    pub show_divisions: bool,
}

impl SummaryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_divisions(mut self) -> Self {
        self.show_divisions = true;
        self
    }
}

impl ReportRenderer for SummaryRenderer {
    type Output = String;

    fn render(&self, report: &Report) -> Result<String, RenderError> {
        let s = &report.stats;
        let mut out = String::new();
        let w = |e: std::fmt::Error| RenderError::Format(e.to_string());

        writeln!(out, "SLA report as of {}", report.as_of).map_err(w)?;
        let lines: [(&str, String); 10] = [
            ("Total Chamados", s.total_chamados.to_string()),
            ("Chamados Concluídos", s.total_chamados_termino.to_string()),
            ("SLA Início", format!("{:.2}%", s.sla_inicio)),
            ("SLA Término", format!("{:.2}%", s.sla_termino)),
            ("Comparação Meta Término", format!("{:.2} pp", s.comparacao_meta_termino)),
            ("Estoque", s.total_estoque.to_string()),
            ("Chamados Atrasados", s.chamados_atrasados.to_string()),
            ("Em Aberto (Sem Previsão)", s.chamados_em_aberto.to_string()),
            ("Fechamento Pendente", s.fechamento_pendente.to_string()),
            ("Total Valor OS", format_money(s.total_valor_os)),
        ];
        for (label, value) in lines {
            writeln!(out, "  {:<28} {:>14}", format!("{label}:"), value).map_err(w)?;
        }

        if self.show_divisions {
            if let Some(table) = report.dimension(ticketsla_core::Dimension::Division) {
                writeln!(out).map_err(w)?;
                writeln!(out, "  {:<24} {:>8} {:>10} {:>10}", "Divisão", "Total", "SLA Ini", "SLA Conc")
                    .map_err(w)?;
                for row in &table.rows {
                    writeln!(
                        out,
                        "  {:<24} {:>8} {:>9.2}% {:>9.2}%",
                        row.key, row.total_chamados, row.pct_sla_inicio, row.pct_sla_conclusao
                    )
                    .map_err(w)?;
                }
            }
        }

        Ok(out)
    }
}

fn format_money(value: Decimal) -> String {
    format!("R$ {}", value.round_dp(2))
}
