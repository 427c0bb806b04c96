// ==========================================
// PlanApi 集成测试
// ==========================================
// 测试目标: 校验 → 展开 → 事务落库 → 查询/替换/删除
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use mine_production_plan::api::ApiError;
use mine_production_plan::config::config_keys;
use mine_production_plan::domain::types::{PlanStatus, Ratio};

// ==========================================
// 创建与查询
// ==========================================

#[test]
fn test_create_plan_persists_parent_and_daily_rows() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let detail = state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 11))
        .unwrap();

    assert_eq!(detail.plan.total_calendar_days, 30);
    assert_eq!(detail.plan.total_holiday_days, 5);
    assert_eq!(detail.plan.total_available_days, 25);
    assert_eq!(detail.plan.total_sr_target, Ratio::Defined(4.0));
    assert!(detail.plan.config_snapshot_json.is_some());

    let loaded = state.plan_api.get_plan(&detail.plan.parent_plan_id).unwrap();
    assert_eq!(loaded.daily_plans, detail.daily_plans);
    assert_eq!(loaded.plan.plan_month, detail.plan.plan_month);
    assert_eq!(loaded.plan.status(), PlanStatus::Active);

    let by_month = state
        .plan_api
        .get_plan_by_month(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap())
        .unwrap();
    assert_eq!(by_month.plan.parent_plan_id, detail.plan.parent_plan_id);
}

#[test]
fn test_undefined_ratio_round_trips_as_null() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let mut input = test_helpers::plan_input(2025, 2);
    input.total_ore_target = 0.0;

    let detail = state.plan_api.create_plan(input).unwrap();
    let daily = state
        .plan_api
        .get_daily_plans(&detail.plan.parent_plan_id)
        .unwrap();

    assert_eq!(daily.len(), 28);
    assert!(daily.iter().all(|d| d.sr_target == Ratio::Undefined));
    assert!(daily.iter().all(|d| d.shift_sr_target == Ratio::Undefined));
    let loaded = state.plan_api.get_plan(&detail.plan.parent_plan_id).unwrap();
    assert_eq!(loaded.plan.total_sr_target, Ratio::Undefined);
}

// ==========================================
// 失败路径
// ==========================================

#[test]
fn test_missing_opening_stock_writes_nothing() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let mut input = test_helpers::plan_input(2025, 11);
    input.total_sisa_stock = None;

    let err = state.plan_api.create_plan(input).unwrap_err();
    assert_eq!(err.kind(), "MissingOpeningStock");
    assert_eq!(err.field().as_deref(), Some("total_sisa_stock"));

    let page = state.plan_api.list_plans(1, 20).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn test_validation_error_lists_fields() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let mut input = test_helpers::plan_input(2025, 11);
    input.total_ore_target = -1.0;
    input.total_fleet = -2;

    match state.plan_api.create_plan(input) {
        Err(ApiError::ValidationError { violations, .. }) => {
            assert_eq!(violations.len(), 2);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_second_plan_for_same_month_is_conflict() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 11))
        .unwrap();
    let err = state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 11))
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
fn test_invalid_input_for_taken_month_reports_violations() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 11))
        .unwrap();

    let mut invalid = test_helpers::plan_input(2025, 11);
    invalid.total_ob_target = -5.0;
    match state.plan_api.create_plan(invalid) {
        Err(ApiError::ValidationError { violations, .. }) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "total_ob_target");
        }
        other => panic!("unexpected: {:?}", other),
    }

    let mut no_stock = test_helpers::plan_input(2025, 11);
    no_stock.total_sisa_stock = None;
    let err = state.plan_api.create_plan(no_stock).unwrap_err();
    assert_eq!(err.kind(), "MissingOpeningStock");
}

#[test]
fn test_get_unknown_plan_is_not_found() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    assert!(matches!(
        state.plan_api.get_plan("missing"),
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.plan_api.get_daily_plans("missing"),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 替换 / 删除
// ==========================================

#[test]
fn test_replace_plan_soft_deletes_previous() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let first = state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 11))
        .unwrap();

    let mut changed = test_helpers::plan_input(2025, 11);
    changed.total_sisa_stock = Some(0);
    let result = state.plan_api.replace_plan(changed).unwrap();

    assert_eq!(
        result.replaced_plan_id.as_deref(),
        Some(first.plan.parent_plan_id.as_str())
    );
    assert_eq!(result.detail.daily_plans[0].daily_old_stock, 0.0);

    let old = state.plan_api.get_plan(&first.plan.parent_plan_id).unwrap();
    assert_eq!(old.plan.status(), PlanStatus::Deleted);
    // 软删除保留日计划以便审计
    assert_eq!(old.daily_plans.len(), 30);

    let active = state
        .plan_api
        .get_plan_by_month(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap())
        .unwrap();
    assert_eq!(active.plan.parent_plan_id, result.detail.plan.parent_plan_id);
}

#[test]
fn test_delete_then_recreate_month() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let detail = state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 3))
        .unwrap();
    state.plan_api.delete_plan(&detail.plan.parent_plan_id).unwrap();

    assert!(matches!(
        state.plan_api.delete_plan(&detail.plan.parent_plan_id),
        Err(ApiError::NotFound(_))
    ));
    assert!(state
        .plan_api
        .get_plan_by_month(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        .is_err());

    state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 3))
        .unwrap();
}

#[test]
fn test_purge_cascades_daily_plans() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    let detail = state
        .plan_api
        .create_plan(test_helpers::plan_input(2025, 4))
        .unwrap();
    state.plan_api.purge_plan(&detail.plan.parent_plan_id).unwrap();
    assert!(matches!(
        state.plan_api.get_daily_plans(&detail.plan.parent_plan_id),
        Err(ApiError::NotFound(_))
    ));
}

// ==========================================
// 分页 / 配置
// ==========================================

#[test]
fn test_list_plans_paginates_by_month_desc() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    for month in 1..=5 {
        state
            .plan_api
            .create_plan(test_helpers::plan_input(2025, month))
            .unwrap();
    }

    let page1 = state.plan_api.list_plans(1, 2).unwrap();
    assert_eq!(page1.total, 5);
    assert_eq!(page1.items.len(), 2);
    assert_eq!(
        page1.items[0].plan_month,
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    );

    let page3 = state.plan_api.list_plans(3, 2).unwrap();
    assert_eq!(page3.items.len(), 1);
    assert_eq!(
        page3.items[0].plan_month,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );

    assert!(matches!(
        state.plan_api.list_plans(0, 2),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state.plan_api.list_plans(1, 0),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_configured_holidays_flow_into_plan() {
    let (_tmp, state) = test_helpers::create_test_state().unwrap();
    state
        .config_manager
        .set_global_config_value(config_keys::PLAN_HOLIDAY_WEEKDAYS, "SAT,SUN")
        .unwrap();

    let preview = state
        .plan_api
        .preview_plan(&test_helpers::plan_input(2025, 11))
        .unwrap();
    assert_eq!(preview.summary.total_holiday_days, 10);
    assert_eq!(preview.summary.total_available_days, 20);

    // 预览不落库
    assert_eq!(state.plan_api.list_plans(1, 20).unwrap().total, 0);
}
