//! OBV (On-Balance Volume) indicator.

/// Calculate OBV (On-Balance Volume).
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period; every bar is defined.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut values = Vec::with_capacity(closes.len());
    let mut obv = 0.0;

    for i in 0..closes.len() {
        if i == 0 {
            obv = volumes[0];
        } else if closes[i] > closes[i - 1] {
            obv += volumes[i];
        } else if closes[i] < closes[i - 1] {
            obv -= volumes[i];
        }
        values.push(obv);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[], &[]).is_empty());
    }

    #[test]
    fn obv_first_bar_is_volume() {
        assert_eq!(calculate_obv(&[100.0], &[5000.0]), vec![5000.0]);
    }

    #[test]
    fn obv_up_down_flat() {
        let closes = [100.0, 105.0, 103.0, 103.0, 110.0];
        let volumes = [1000.0, 2000.0, 1500.0, 800.0, 3000.0];
        let series = calculate_obv(&closes, &volumes);
        assert_eq!(series, vec![1000.0, 3000.0, 1500.0, 1500.0, 4500.0]);
    }

    #[test]
    fn obv_can_go_negative() {
        let series = calculate_obv(&[100.0, 90.0, 80.0], &[100.0, 500.0, 500.0]);
        assert_eq!(series[2], -900.0);
    }
}
