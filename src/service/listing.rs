use uuid::Uuid;

use crate::{
    db::RatingStore,
    engine::{
        pagination::{paginate_favorites_first, paginate_pinned},
        reaction::sort_samples,
    },
    errors::AppError,
    models::{
        Actor, AggregateFilter, AggregateView, FavoritesPage, PageRequest, PinnedPage,
        ReactionState, SampleOrder, SampleView, ScoredSample,
    },
    service::samples::get_visible_aggregate,
};

/// Samples of one aggregate; the viewer's own sample is pinned to page 1.
pub async fn list_samples(
    store: &dyn RatingStore,
    aggregate_id: Uuid,
    viewer: Option<Actor>,
    order: SampleOrder,
    request: PageRequest,
) -> Result<PinnedPage<SampleView>, AppError> {
    get_visible_aggregate(store, aggregate_id).await?;

    let samples = store.active_samples(aggregate_id).await?;
    let mut views = annotate_samples(store, samples, viewer).await?;
    sort_samples(&mut views, order);

    let viewer_id = viewer.map(|v| v.id);
    let page = paginate_pinned(
        views,
        |view| Some(view.sample.author_id) == viewer_id,
        request,
    )?;

    tracing::debug!(
        "Listed page {}/{} of aggregate {} ({} samples, pinned: {})",
        page.page,
        page.page_count,
        aggregate_id,
        page.total_count,
        page.pinned.is_some()
    );
    Ok(page)
}

/// Visible aggregates, newest first, with the viewer's favorites leading page 1.
pub async fn list_aggregates(
    store: &dyn RatingStore,
    filter: &AggregateFilter,
    viewer: Option<Actor>,
    request: PageRequest,
) -> Result<FavoritesPage<AggregateView>, AppError> {
    let favorites = match viewer {
        Some(actor) => store.favorites(actor.id).await?,
        None => Default::default(),
    };

    let views: Vec<AggregateView> = store
        .list_aggregates()
        .await?
        .into_iter()
        .filter(|aggregate| filter.matches(aggregate))
        .map(|aggregate| AggregateView {
            is_favorite: favorites.contains(&aggregate.id),
            aggregate,
        })
        .collect();

    let page = paginate_favorites_first(views, |view| view.is_favorite, request)?;

    tracing::debug!(
        "Listed aggregate page {}/{} ({} total, {} favorites)",
        page.page,
        page.page_count,
        page.total_count,
        page.favorites.len()
    );
    Ok(page)
}

/// Reaction counts are read live for every sample; nothing is cached on the sample.
async fn annotate_samples(
    store: &dyn RatingStore,
    samples: Vec<ScoredSample>,
    viewer: Option<Actor>,
) -> Result<Vec<SampleView>, AppError> {
    let ids: Vec<Uuid> = samples.iter().map(|s| s.id).collect();

    let (counts, mine) = futures::try_join!(store.reaction_counts_many(&ids), async {
        match viewer {
            Some(actor) => store.reactions_of(actor.id, &ids).await,
            None => Ok(vec![ReactionState::None; ids.len()]),
        }
    })?;

    if counts.len() != ids.len() || mine.len() != ids.len() {
        return Err(AppError::InternalError(
            "Reaction lookup returned a different number of samples".into(),
        ));
    }

    Ok(samples
        .into_iter()
        .zip(counts)
        .zip(mine)
        .map(|((sample, counts), mine)| SampleView::new(sample, counts, mine))
        .collect())
}
