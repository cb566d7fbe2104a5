//! Summary tables over enriched records

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use ticketsla_core::report::{percent, round2};
use ticketsla_core::timeutil::format_hms;
use ticketsla_core::{
    AccumulatedPoint, DeadlineStatus, DelayStatus, Dimension, DimensionRow, DimensionTable,
    GeneralStats, MonthlySummary, ResponsibleCount, SlaConfig, TicketRecord, YearMonth,
};

// ============================================================================
// General statistics
// ============================================================================

fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn distinct<'a, I: Iterator<Item = Option<&'a str>>>(values: I) -> usize {
    values
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Whole-table statistics
pub fn general_stats(records: &[TicketRecord], config: &SlaConfig) -> GeneralStats {
    let total = records.len();
    let completed = records.iter().filter(|r| r.dates.conclusao.is_some()).count();
    let completion_np = records
        .iter()
        .filter(|r| r.dates.conclusao.is_some() && r.metrics.prazo_conclusao_ajustado.is_on_time())
        .count();
    let start_np = records
        .iter()
        .filter(|r| r.metrics.prazo_inicio_ajustado.is_on_time())
        .count();

    let sla_inicio = percent(start_np, total);
    let sla_termino = percent(completion_np, completed);

    let valores: Vec<Decimal> = records.iter().filter_map(|r| r.valor_total).collect();
    let total_valor_os: Decimal = valores.iter().copied().sum();
    let media_valor_os = if valores.is_empty() {
        0.0
    } else {
        (total_valor_os / Decimal::from(valores.len())).to_f64().unwrap_or(0.0)
    };

    let arrival_seconds: Vec<f64> = records
        .iter()
        .filter(|r| r.dates.chegada.is_some() && r.dates.criacao.is_some())
        .map(|r| r.metrics.segundos_chegada as f64)
        .collect();

    let with = |pick: fn(&TicketRecord) -> Option<NaiveDateTime>, value: fn(&TicketRecord) -> i64| {
        round2(mean(
            records
                .iter()
                .filter(|r| pick(r).is_some())
                .map(|r| value(r) as f64),
        ))
    };

    GeneralStats {
        total_chamados: total,
        total_chamados_termino: completed,
        total_conclusao_np: completion_np,
        total_inicio_np: start_np,
        sla_inicio: round2(sla_inicio),
        sla_termino: round2(sla_termino),
        comparacao_meta_inicio: round2(sla_inicio - config.meta_sla),
        comparacao_meta_termino: round2(sla_termino - config.meta_sla),
        comparacao_meta_limpeza_termino: round2(sla_termino - config.meta_limpeza),
        total_estoque: records.iter().filter(|r| r.metrics.in_stock).count(),
        total_fornecedor: distinct(records.iter().map(|r| r.fornecedor.as_deref())),
        total_chamados_concluidos: records
            .iter()
            .filter(|r| r.metrics.data_conclusao_ajustada.is_some())
            .count(),
        total_chamados_fp: total - completion_np,
        fechamento_pendente: records.iter().filter(|r| r.metrics.pending_closure).count(),
        a_vencer_wtm_30_dias: records.iter().filter(|r| r.metrics.due_soon).count(),
        chamados_atrasados: records
            .iter()
            .filter(|r| r.metrics.status_atraso.is_late())
            .count(),
        chamados_em_aberto: records
            .iter()
            .filter(|r| r.metrics.status_atraso == DelayStatus::OpenWithoutForecast)
            .count(),
        media_dias_atrasos: round2(mean(records.iter().map(|r| r.metrics.dias_atrasos as f64))),
        media_dias_chegada: with(|r| r.dates.chegada, |r| r.metrics.dias_chegada),
        media_dias_conclusao: with(|r| r.dates.conclusao, |r| r.metrics.dias_conclusao),
        media_dias_fechamento: with(|r| r.dates.fechamento, |r| r.metrics.dias_fechados),
        media_tempo_atendimento: round2(mean(
            records.iter().map(|r| r.metrics.tempo_atendimento as f64),
        )),
        media_valor_os: round2(media_valor_os),
        qtd_agencias: distinct(records.iter().map(|r| r.uniorg_comercial.as_deref())),
        total_valor_os,
        media_tempo_chegada: format_hms(mean(arrival_seconds.iter().copied())),
        tempo_chegada: format_hms(arrival_seconds.iter().sum()),
    }
}

// ============================================================================
// Grouped summaries
// ============================================================================

#[derive(Default)]
struct GroupTotals {
    total: usize,
    np_inicio: usize,
    np_conclusao: usize,
    business_days: i64,
    valor: Decimal,
}

impl GroupTotals {
    fn add(&mut self, record: &TicketRecord) {
        self.total += 1;
        if record.metrics.prazo_inicio_ajustado.is_on_time() {
            self.np_inicio += 1;
        }
        if record.metrics.prazo_conclusao_ajustado.is_on_time() {
            self.np_conclusao += 1;
        }
        self.business_days += record.metrics.duracao_dias_uteis;
        self.valor += record.valor_total.unwrap_or_default();
    }
}

/// Summary of one dimension, largest groups first, ties by key.
///
/// Records with no value for the dimension are left out.
pub fn dimension_table(records: &[TicketRecord], dimension: Dimension, limit: usize) -> DimensionTable {
    let mut groups: BTreeMap<&str, GroupTotals> = BTreeMap::new();
    for record in records {
        if let Some(key) = record.dimension(dimension) {
            groups.entry(key).or_default().add(record);
        }
    }

    let mut rows: Vec<DimensionRow> = groups
        .into_iter()
        .map(|(key, g)| DimensionRow {
            key: key.to_string(),
            total_chamados: g.total,
            np_inicio: g.np_inicio,
            np_conclusao: g.np_conclusao,
            tempo_medio_resolucao: round2(g.business_days as f64 / g.total as f64),
            valor_total_os: g.valor,
            pct_sla_inicio: round2(percent(g.np_inicio, g.total)),
            pct_sla_conclusao: round2(percent(g.np_conclusao, g.total)),
        })
        .collect();
    // Stable sort keeps the BTreeMap key order among equal totals
    rows.sort_by(|a, b| b.total_chamados.cmp(&a.total_chamados));
    rows.truncate(limit);

    DimensionTable { dimension, rows }
}

/// Per creation month, oldest first
pub fn monthly_evolution(records: &[TicketRecord]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<YearMonth, GroupTotals> = BTreeMap::new();
    for record in records {
        if let Some(period) = record.metrics.periodo {
            months.entry(period).or_default().add(record);
        }
    }
    months
        .into_iter()
        .map(|(period, g)| MonthlySummary {
            period,
            total_chamados: g.total,
            np_inicio: g.np_inicio,
            np_conclusao: g.np_conclusao,
            pct_sla_inicio: round2(percent(g.np_inicio, g.total)),
            pct_sla_conclusao: round2(percent(g.np_conclusao, g.total)),
        })
        .collect()
}

/// Responsible parties with the most tickets
pub fn top_responsibles(records: &[TicketRecord], limit: usize) -> Vec<ResponsibleCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(name) = record.dimension(Dimension::Responsible) {
            *counts.entry(name).or_default() += 1;
        }
    }
    let mut top: Vec<ResponsibleCount> = counts
        .into_iter()
        .map(|(responsavel, total_chamados)| ResponsibleCount {
            responsavel: responsavel.to_string(),
            total_chamados,
        })
        .collect();
    top.sort_by(|a, b| {
        b.total_chamados
            .cmp(&a.total_chamados)
            .then_with(|| a.responsavel.cmp(&b.responsavel))
    });
    top.truncate(limit);
    top
}

/// Indices of records matching a predicate, in record order
pub fn select(records: &[TicketRecord], pred: impl Fn(&TicketRecord) -> bool) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| pred(r))
        .map(|(i, _)| i)
        .collect()
}

/// Start deadline missed
pub fn fp_inicio(records: &[TicketRecord]) -> Vec<usize> {
    select(records, |r| r.metrics.status_prazo_inicio == DeadlineStatus::Late)
}

/// Completion deadline missed
pub fn fp_conclusao(records: &[TicketRecord]) -> Vec<usize> {
    select(records, |r| r.metrics.status_prazo_conclusao == DeadlineStatus::Late)
}

/// Late, completed late, or open without forecast
pub fn late_and_open(records: &[TicketRecord]) -> Vec<usize> {
    select(records, |r| r.metrics.status_atraso.needs_attention())
}

/// Running created/completed totals per distinct creation timestamp
pub fn accumulated(records: &[TicketRecord]) -> Vec<AccumulatedPoint> {
    let mut by_creation: BTreeMap<NaiveDateTime, (usize, usize)> = BTreeMap::new();
    for record in records {
        if let Some(criacao) = record.dates.criacao {
            let entry = by_creation.entry(criacao).or_default();
            entry.0 += 1;
            if record.dates.conclusao.is_some() {
                entry.1 += 1;
            }
        }
    }

    let (mut created, mut completed) = (0, 0);
    by_creation
        .into_iter()
        .map(|(criacao, (new, done))| {
            created += new;
            completed += done;
            AccumulatedPoint {
                criacao,
                acumulado_criados: created,
                acumulado_concluidos: completed,
            }
        })
        .collect()
}
