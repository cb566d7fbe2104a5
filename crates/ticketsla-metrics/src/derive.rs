//! Per-record SLA columns
//!
//! Every derived field depends only on the record's own dates and deadline
//! flags, the reference instant and the thresholds. Records never read each
//! other.

use chrono::NaiveDateTime;
use ticketsla_core::timeutil::{business_days_between, days_between, seconds_between};
use ticketsla_core::{
    AdjustedDeadline, CompletionState, DeadlineStatus, DelayBucket, DelayStatus, FinancialStatus,
    SlaConfig, TicketDates, TicketMetrics, TicketRecord, YearMonth,
};

/// Compute the derived columns of one record.
///
/// `uf_mapa` is kept from the division mapping step.
pub fn derive_metrics(record: &TicketRecord, as_of: NaiveDateTime, config: &SlaConfig) -> TicketMetrics {
    let d = &record.dates;

    let in_stock = d.conclusao.is_none() && d.fechamento.is_none();
    let duracao_chamado = d.criacao.map(|c| days_between(as_of, c));
    let (status_atraso, dias_atraso) = delay_status(d, as_of);

    let status_prazo_inicio = start_status(d);
    let status_prazo_conclusao = completion_status(d);

    TicketMetrics {
        prazo_inicio_ajustado: AdjustedDeadline::resolve(record.prazo_inicio.as_deref()),
        prazo_conclusao_ajustado: AdjustedDeadline::resolve(record.prazo_conclusao.as_deref()),
        status_chamado: if d.conclusao.is_some() {
            CompletionState::Completed
        } else {
            CompletionState::Pending
        },
        status_fechamento: if in_stock {
            CompletionState::Pending
        } else {
            CompletionState::Completed
        },
        status_financeiro: if d.fechamento.is_some() {
            FinancialStatus::Closed
        } else {
            FinancialStatus::Pending
        },
        in_stock,
        data_conclusao_ajustada: d.conclusao.or(d.fechamento),
        data_estoque: in_stock.then_some(as_of),
        pending_closure: d.fechamento.is_none()
            && d
                .conclusao
                .is_some_and(|c| days_between(as_of, c) > config.pending_closure_days),
        duracao_chamado,
        dias_atrasos: d
            .previsao_conclusao
            .map_or(0, |p| days_between(as_of, p) + 1),
        dias_chegada: elapsed_at_least_one(d.chegada, d.criacao),
        dias_conclusao: elapsed_at_least_one(d.conclusao, d.criacao),
        dias_fechados: elapsed_at_least_one(d.fechamento, d.criacao),
        tempo_atendimento: elapsed(d.conclusao, d.criacao).unwrap_or(0),
        segundos_chegada: match (d.chegada, d.criacao) {
            (Some(chegada), Some(criacao)) => seconds_between(chegada, criacao),
            _ => 0,
        },
        faixa_dias_em_aberto: DelayBucket::classify(duracao_chamado.unwrap_or(0), config.delay_buckets),
        due_soon: duracao_chamado
            .is_some_and(|days| (config.due_soon_min..config.due_soon_max).contains(&days)),
        uf_mapa: record.metrics.uf_mapa.clone(),
        periodo: d.criacao.map(|c| YearMonth::of(c.date())),
        status_atraso,
        dias_atraso,
        status_prazo_inicio,
        status_prazo_conclusao,
        dias_atraso_inicio: if status_prazo_inicio == DeadlineStatus::Late {
            elapsed(d.chegada.or(d.primeiro_encaminhamento), d.previsao_chegada).unwrap_or(0)
        } else {
            0
        },
        dias_atraso_conclusao: if status_prazo_conclusao == DeadlineStatus::Late {
            elapsed(d.conclusao, d.previsao_conclusao).unwrap_or(0)
        } else {
            0
        },
        duracao_dias_uteis: d.criacao.map_or(0, |c| {
            let end = d.conclusao.unwrap_or(as_of);
            business_days_between(c.date(), end.date())
        }),
    }
}

/// Derive metrics for every record in place
pub fn apply_metrics(records: &mut [TicketRecord], as_of: NaiveDateTime, config: &SlaConfig) {
    for record in records.iter_mut() {
        record.metrics = derive_metrics(record, as_of, config);
    }
}

fn elapsed(later: Option<NaiveDateTime>, earlier: Option<NaiveDateTime>) -> Option<i64> {
    Some(days_between(later?, earlier?))
}

/// Elapsed days where zero, including an unset date, counts as one day
fn elapsed_at_least_one(later: Option<NaiveDateTime>, earlier: Option<NaiveDateTime>) -> i64 {
    match elapsed(later, earlier).unwrap_or(0) {
        0 => 1,
        days => days,
    }
}

/// Delay situation against the expected completion, with the delay in days
fn delay_status(d: &TicketDates, as_of: NaiveDateTime) -> (DelayStatus, i64) {
    match (d.conclusao, d.previsao_conclusao) {
        (Some(done), Some(expected)) if done > expected => {
            (DelayStatus::CompletedLate, days_between(done, expected))
        }
        (Some(_), Some(_)) => (DelayStatus::OnSchedule, 0),
        (None, Some(expected)) if expected < as_of => {
            (DelayStatus::Late, days_between(as_of, expected))
        }
        (None, Some(_)) => (DelayStatus::OnSchedule, 0),
        (None, None) => (
            DelayStatus::OpenWithoutForecast,
            d.criacao.map_or(0, |c| days_between(as_of, c)),
        ),
        (Some(_), None) => (DelayStatus::Undefined, 0),
    }
}

/// Start deadline: first forwarding, else arrival, against expected arrival
fn start_status(d: &TicketDates) -> DeadlineStatus {
    let start = d.primeiro_encaminhamento.or(d.chegada);
    match (start, d.previsao_chegada) {
        (Some(start), Some(expected)) => DeadlineStatus::compare(start, expected),
        _ => DeadlineStatus::Undefined,
    }
}

fn completion_status(d: &TicketDates) -> DeadlineStatus {
    match (d.conclusao, d.previsao_conclusao) {
        (_, None) => DeadlineStatus::Undefined,
        (None, Some(_)) => DeadlineStatus::Pending,
        (Some(done), Some(expected)) => DeadlineStatus::compare(done, expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn derive(record: &TicketRecord, as_of: NaiveDateTime) -> TicketMetrics {
        derive_metrics(record, as_of, &SlaConfig::default())
    }

    #[test]
    fn completed_before_deadline_is_on_time() {
        let record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .expected_completion(at(2024, 1, 10))
            .completed(at(2024, 1, 5));
        let m = derive(&record, at(2024, 3, 1));

        assert_eq!(m.status_prazo_conclusao, DeadlineStatus::OnTime);
        assert_eq!(m.status_prazo_conclusao.as_str(), "No Prazo");
        assert_eq!(m.tempo_atendimento, 4);
        assert_eq!(m.dias_conclusao, 4);
        assert_eq!(m.dias_atraso_conclusao, 0);
        assert_eq!(m.status_atraso, DelayStatus::OnSchedule);
        assert_eq!(m.status_chamado, CompletionState::Completed);
        assert!(!m.in_stock);
    }

    #[test]
    fn completed_after_deadline_is_late() {
        let record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .expected_completion(at(2024, 1, 10))
            .completed(at(2024, 1, 13));
        let m = derive(&record, at(2024, 3, 1));

        assert_eq!(m.status_prazo_conclusao, DeadlineStatus::Late);
        assert_eq!(m.dias_atraso_conclusao, 3);
        assert_eq!(m.status_atraso, DelayStatus::CompletedLate);
        assert_eq!(m.dias_atraso, 3);
    }

    #[test]
    fn open_ticket_past_forecast() {
        let as_of = at(2024, 2, 1);
        let record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .expected_completion(at(2024, 1, 20));
        let m = derive(&record, as_of);

        assert_eq!(m.status_atraso, DelayStatus::Late);
        assert_eq!(m.dias_atraso, 12);
        assert_eq!(m.dias_atrasos, 13);
        assert_eq!(m.status_prazo_conclusao, DeadlineStatus::Pending);
        assert!(m.in_stock);
        assert_eq!(m.data_estoque, Some(as_of));
        assert_eq!(m.duracao_chamado, Some(31));
        assert_eq!(m.faixa_dias_em_aberto, DelayBucket::Over30);
        assert!(!m.due_soon);
    }

    #[test]
    fn open_ticket_without_forecast() {
        let record = TicketRecord::new("1").created(at(2024, 1, 1));
        let m = derive(&record, at(2024, 1, 25));

        assert_eq!(m.status_atraso, DelayStatus::OpenWithoutForecast);
        assert_eq!(m.dias_atraso, 24);
        assert!(m.due_soon);
        assert_eq!(m.status_prazo_conclusao, DeadlineStatus::Undefined);
        assert_eq!(m.status_prazo_inicio, DeadlineStatus::Undefined);
    }

    #[test]
    fn unset_deadline_flags_resolve_on_time() {
        let record = TicketRecord::new("1").created(at(2024, 1, 1));
        let m = derive(&record, at(2024, 1, 2));
        assert_eq!(m.prazo_inicio_ajustado.label(), "No Prazo");
        assert_eq!(m.prazo_conclusao_ajustado.label(), "No Prazo");

        let flagged = TicketRecord::new("2").prazos("NA", "FP");
        let m = derive(&flagged, at(2024, 1, 2));
        assert!(m.prazo_inicio_ajustado.is_on_time());
        assert_eq!(m.prazo_conclusao_ajustado.label(), "Atrasado");
    }

    #[test]
    fn start_status_prefers_first_forwarding() {
        let mut record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .expected_arrival(at(2024, 1, 3))
            .arrived(at(2024, 1, 6));
        record.dates.primeiro_encaminhamento = Some(at(2024, 1, 2));
        let m = derive(&record, at(2024, 2, 1));
        assert_eq!(m.status_prazo_inicio, DeadlineStatus::OnTime);
        assert_eq!(m.dias_atraso_inicio, 0);

        record.dates.primeiro_encaminhamento = None;
        let m = derive(&record, at(2024, 2, 1));
        assert_eq!(m.status_prazo_inicio, DeadlineStatus::Late);
        assert_eq!(m.dias_atraso_inicio, 3);
    }

    #[test]
    fn same_day_arrival_counts_one_day() {
        let created = at(2024, 1, 1);
        let record = TicketRecord::new("1")
            .created(created)
            .arrived(created + chrono::Duration::hours(5));
        let m = derive(&record, at(2024, 1, 2));
        assert_eq!(m.dias_chegada, 1);
        assert_eq!(m.segundos_chegada, 5 * 3600);
        assert_eq!(m.dias_fechados, 1);
    }

    #[test]
    fn unset_event_dates_count_one_day() {
        let record = TicketRecord::new("1").created(at(2024, 1, 1));
        let m = derive(&record, at(2024, 2, 1));
        assert_eq!(m.dias_chegada, 1);
        assert_eq!(m.dias_conclusao, 1);
        assert_eq!(m.dias_fechados, 1);
        assert_eq!(m.tempo_atendimento, 0);
    }

    #[test]
    fn due_soon_window_bounds() {
        let as_of = at(2024, 6, 1);
        let due_soon = |age: i64| {
            let record = TicketRecord::new("1").created(as_of - chrono::Duration::days(age));
            derive(&record, as_of).due_soon
        };
        assert!(!due_soon(19));
        assert!(due_soon(20));
        assert!(due_soon(29));
        assert!(!due_soon(30));
    }

    #[test]
    fn pending_closure_after_thirty_days() {
        let record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .completed(at(2024, 1, 5));
        assert!(derive(&record, at(2024, 2, 5)).pending_closure);
        assert!(!derive(&record, at(2024, 2, 4)).pending_closure);

        let closed = record.closed(at(2024, 1, 6));
        let m = derive(&closed, at(2024, 3, 1));
        assert!(!m.pending_closure);
        assert_eq!(m.status_financeiro, FinancialStatus::Closed);
    }

    #[test]
    fn closure_fills_adjusted_completion() {
        let record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .closed(at(2024, 1, 9));
        let m = derive(&record, at(2024, 2, 1));
        assert_eq!(m.data_conclusao_ajustada, Some(at(2024, 1, 9)));
        assert_eq!(m.status_chamado, CompletionState::Pending);
        assert_eq!(m.status_fechamento, CompletionState::Completed);
        assert_eq!(m.data_estoque, None);
    }

    #[test]
    fn business_day_duration() {
        // Mon 2024-01-01 to Mon 2024-01-15
        let record = TicketRecord::new("1")
            .created(at(2024, 1, 1))
            .completed(at(2024, 1, 15));
        assert_eq!(derive(&record, at(2024, 3, 1)).duracao_dias_uteis, 10);

        let no_creation = TicketRecord::new("2");
        assert_eq!(derive(&no_creation, at(2024, 3, 1)).duracao_dias_uteis, 0);
    }

    #[test]
    fn buckets_grow_with_age() {
        let as_of = at(2024, 6, 1);
        let mut previous = DelayBucket::UpTo30;
        for age in 0..150 {
            let record = TicketRecord::new("1").created(as_of - chrono::Duration::days(age));
            let bucket = derive(&record, as_of).faixa_dias_em_aberto;
            assert!(bucket >= previous);
            previous = bucket;
        }
        assert_eq!(previous, DelayBucket::Over90);
    }
}
