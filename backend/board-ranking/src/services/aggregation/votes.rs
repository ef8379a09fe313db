use crate::models::VoteAggregates;

/// Fold vote values into a tally. An empty input is a valid, all-zero result.
pub fn aggregate_votes<I>(values: I) -> VoteAggregates
where
    I: IntoIterator<Item = i32>,
{
    values
        .into_iter()
        .fold(VoteAggregates::default(), |mut acc, value| {
            acc.sum += i64::from(value);
            acc.count += 1;
            if value == 1 {
                acc.positive_count += 1;
            }
            acc
        })
}
