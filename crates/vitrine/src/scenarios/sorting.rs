use crate::assertion::Assertion;
use crate::config::UserRole;
use crate::fixture::TestScope;
use crate::harness::Scenario;
use crate::pages::SortCriterion;
use crate::result::VitrineResult;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "sorting: name ascending is the default",
            &["sorting", "smoke"],
            name_ascending_is_default,
        ),
        Scenario::new(
            "sorting: every criterion orders the list",
            &["sorting", "regression"],
            every_criterion_orders_list,
        ),
        Scenario::new(
            "sorting: unsupported criterion leaves order unchanged",
            &["sorting", "negative"],
            unsupported_criterion_is_rejected,
        ),
        Scenario::new(
            "sorting: problem user cannot change the order",
            &["sorting", "negative", "regression"],
            problem_user_sort_is_ignored,
        ),
    ]
}

async fn name_ascending_is_default(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    Assertion::equals(&SortCriterion::NameAscending, &inventory.current_sort().await?).check()?;
    Assertion::is_sorted_by(&inventory.product_names().await?, |a, b| a <= b).check()
}

async fn every_criterion_orders_list(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    for criterion in SortCriterion::ALL {
        inventory.sort_by(criterion).await?;
        let label = criterion.label();
        Assertion::equals(&criterion, &inventory.current_sort().await?)
            .context(label)
            .check()?;
        let check = match criterion {
            SortCriterion::NameAscending => {
                Assertion::is_sorted_by(&inventory.product_names().await?, |a, b| a <= b)
            }
            SortCriterion::NameDescending => {
                Assertion::is_sorted_by(&inventory.product_names().await?, |a, b| a >= b)
            }
            SortCriterion::PriceAscending => {
                Assertion::is_sorted_by(&inventory.product_prices().await?, |a, b| a <= b)
            }
            SortCriterion::PriceDescending => {
                Assertion::is_sorted_by(&inventory.product_prices().await?, |a, b| a >= b)
            }
        };
        check.context(label).check()?;
    }
    Ok(())
}

async fn unsupported_criterion_is_rejected(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Standard).await?;
    inventory.sort_by(SortCriterion::PriceAscending).await?;
    let before = inventory.product_names().await?;

    let result = inventory.sort_by_name("popularity").await;

    Assertion::fails_with(&result, "UnsupportedSortCriterion").check()?;
    Assertion::equals(&before, &inventory.product_names().await?)
        .context("displayed order")
        .check()?;
    Assertion::equals(&SortCriterion::PriceAscending, &inventory.current_sort().await?).check()
}

async fn problem_user_sort_is_ignored(scope: TestScope) -> VitrineResult<()> {
    let inventory = scope.logged_in(UserRole::Problem).await?;
    let before = inventory.product_names().await?;
    inventory.sort_by(SortCriterion::NameDescending).await?;
    Assertion::equals(&before, &inventory.product_names().await?)
        .context("problem user order")
        .check()
}
